//! Bearer-token extractor for authenticated routes.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use turnero_core::AppError;
use turnero_service::OperatorContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracts and validates the operator identity from the
/// `Authorization: Bearer <token>` header.
pub struct AuthOperator(pub OperatorContext);

impl FromRequestParts<AppState> for AuthOperator {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid authorization header format"))?;

        let claims = state.decoder.decode(token)?;
        Ok(AuthOperator(OperatorContext::from(claims)))
    }
}
