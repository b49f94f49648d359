use crate::domain::auth::RefreshTokenRepository;
use crate::shared::error::AppError;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

/// Deletes refresh token rows that expired longer ago than the retention window.
///
/// Rows inside the window are kept so a replayed, already rotated token is still
/// recognized as reuse rather than as an unknown token. Once a rotated row is
/// purged that history is gone: replaying it yields `Invalid`, not `Reused`.
pub struct PurgeExpiredTokensUseCase {
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    retention_days: i64,
}

impl PurgeExpiredTokensUseCase {
    pub fn new(refresh_token_repo: Arc<dyn RefreshTokenRepository>, retention_days: i64) -> Self {
        Self {
            refresh_token_repo,
            retention_days: retention_days.max(0),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, now: OffsetDateTime) -> Result<u64, AppError> {
        let cutoff = self
            .retention_days
            .checked_mul(86_400)
            .and_then(|seconds| now.checked_sub(Duration::seconds(seconds)))
            .ok_or_else(|| {
                AppError::InternalServerError(anyhow::anyhow!(
                    "Retention of {} days is out of range",
                    self.retention_days
                ))
            })?;

        let deleted = self
            .refresh_token_repo
            .delete_expired_before(cutoff)
            .await
            .map_err(AppError::InternalServerError)?;

        tracing::info!("Purged {} refresh token(s) expired before {}", deleted, cutoff);
        Ok(deleted)
    }
}
