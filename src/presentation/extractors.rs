use crate::domain::auth::{AuthService, Claims};
use crate::infrastructure::state::AppState;
use crate::shared::error::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Authenticated user extractor
/// Validates the access token from the Authorization header
pub struct AuthUser {
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let claims = state
            .auth_service
            .validate_access_token(token)
            .map_err(|e| {
                tracing::debug!("Access token rejected: {}", e);
                AppError::Unauthorized("Invalid or expired token".to_string())
            })?;

        Ok(AuthUser { claims })
    }
}
