//! Token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use turnero_core::config::AuthConfig;
use turnero_core::error::AppError;

use super::claims::Claims;

/// Validates operator tokens.
#[derive(Clone)]
pub struct TokenDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for TokenDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a token string, checking signature and
    /// expiration.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::authentication("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::claims::OperatorRole;
    use crate::encoder::TokenEncoder;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            leeway_seconds: 5,
        }
    }

    #[test]
    fn round_trips_a_valid_token() {
        let cfg = config("test-secret");
        let encoder = TokenEncoder::new(&cfg);
        let id = Uuid::new_v4();
        let token = encoder
            .generate(id, "Ana", OperatorRole::Operator, 3600)
            .unwrap();

        let claims = TokenDecoder::new(&cfg).decode(&token).unwrap();
        assert_eq!(claims.operator_id(), id);
        assert_eq!(claims.name, "Ana");
        assert_eq!(claims.role, OperatorRole::Operator);
        assert!(!claims.is_expired());
    }

    #[test]
    fn rejects_a_token_signed_with_a_different_secret() {
        let encoder = TokenEncoder::new(&config("secret-a"));
        let token = encoder
            .generate(Uuid::new_v4(), "Ana", OperatorRole::Operator, 3600)
            .unwrap();

        let err = TokenDecoder::new(&config("secret-b"))
            .decode(&token)
            .unwrap_err();
        assert_eq!(err.kind, turnero_core::error::ErrorKind::Authentication);
    }

    #[test]
    fn rejects_an_expired_token() {
        let cfg = config("test-secret");
        let encoder = TokenEncoder::new(&cfg);
        let token = encoder
            .generate(Uuid::new_v4(), "Ana", OperatorRole::Admin, -3600)
            .unwrap();

        let err = TokenDecoder::new(&cfg).decode(&token).unwrap_err();
        assert_eq!(err.kind, turnero_core::error::ErrorKind::Authentication);
        assert!(err.message.contains("expired"));
    }

    #[test]
    fn rejects_garbage_input() {
        let decoder = TokenDecoder::new(&config("test-secret"));
        assert!(decoder.decode("not-a-jwt").is_err());
        assert!(decoder.decode("").is_err());
    }

    #[test]
    fn expiration_timestamp_is_in_the_future_for_fresh_tokens() {
        let cfg = config("test-secret");
        let token = TokenEncoder::new(&cfg)
            .generate(Uuid::new_v4(), "Ana", OperatorRole::Operator, 3600)
            .unwrap();
        let claims = TokenDecoder::new(&cfg).decode(&token).unwrap();
        assert!(claims.expires_at() > Utc::now());
    }
}
