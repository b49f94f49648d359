use crate::domain::auth::RefreshTokenRepository;
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

pub struct LogoutUseCase {
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
}

impl LogoutUseCase {
    pub fn new(refresh_token_repo: Arc<dyn RefreshTokenRepository>) -> Self {
        Self { refresh_token_repo }
    }

    /// Revoke the token without a replacement link. Unknown or already revoked
    /// tokens are accepted silently.
    #[tracing::instrument(skip_all)]
    pub async fn execute(&self, req: LogoutRequest) -> Result<(), AppError> {
        if req.refresh_token.is_empty() {
            tracing::debug!("Logout without a refresh token");
            return Ok(());
        }

        let revoked = self
            .refresh_token_repo
            .revoke(&req.refresh_token, OffsetDateTime::now_utc())
            .await
            .map_err(AppError::InternalServerError)?;

        if revoked {
            tracing::info!("Refresh token revoked on logout");
        } else {
            tracing::debug!("Logout for unknown or already revoked token");
        }

        Ok(())
    }
}
