//! Token creation for fixtures and local tooling.
//!
//! Production tokens come from the identity collaborator; this encoder
//! mints compatible tokens for tests and development setups.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use turnero_core::config::AuthConfig;
use turnero_core::error::AppError;

use super::claims::{Claims, OperatorRole};

/// Creates signed operator tokens.
#[derive(Clone)]
pub struct TokenEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
}

impl TokenEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    /// Generates a token for the given operator, valid for
    /// `ttl_seconds` from now.
    pub fn generate(
        &self,
        operator_id: Uuid,
        name: &str,
        role: OperatorRole,
        ttl_seconds: i64,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: operator_id,
            name: name.to_string(),
            role,
            iat: now.timestamp(),
            exp: now.timestamp() + ttl_seconds,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }
}
