use crate::application::auth::token_utils::{TokenPair, generate_refresh_token, issue_access_token};
use crate::domain::auth::{AuthService, RefreshToken, RefreshTokenRepository, RotationOutcome};
use crate::domain::identity::IdentityProvider;
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// What presenting a refresh token led to
#[derive(Debug, Clone)]
pub enum RotationResult {
    /// The token was active; it is now rotated and this pair replaces it
    Success(TokenPair),
    /// Unknown, expired, logged out, or owned by a user that no longer exists
    Invalid,
    /// An already rotated token was presented again; every session of the user is revoked
    Reused,
}

impl RotationResult {
    /// Collapse the non-success outcomes into their caller-facing errors
    pub fn into_token_pair(self) -> Result<TokenPair, AppError> {
        match self {
            RotationResult::Success(pair) => Ok(pair),
            RotationResult::Invalid => Err(AppError::InvalidRefreshToken),
            RotationResult::Reused => Err(AppError::RefreshTokenReused),
        }
    }
}

pub struct RefreshTokenUseCase {
    identity: Arc<dyn IdentityProvider>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    auth_service: Arc<dyn AuthService>,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl RefreshTokenUseCase {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
        auth_service: Arc<dyn AuthService>,
        access_token_expiry: i64,
        refresh_token_expiry: i64,
    ) -> Self {
        Self {
            identity,
            refresh_token_repo,
            auth_service,
            access_token_expiry,
            refresh_token_expiry,
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn execute(&self, req: RefreshTokenRequest) -> Result<RotationResult, AppError> {
        let now = OffsetDateTime::now_utc();

        let Some(stored) = self
            .refresh_token_repo
            .find_by_token(&req.refresh_token)
            .await
            .map_err(AppError::InternalServerError)?
        else {
            tracing::debug!("Refresh token not found");
            return Ok(RotationResult::Invalid);
        };

        let Some(user) = self
            .identity
            .find_user_by_id(stored.user_id)
            .await
            .map_err(AppError::InternalServerError)?
        else {
            tracing::warn!("Refresh token owner {} no longer exists", stored.user_id);
            return Ok(RotationResult::Invalid);
        };

        if stored.was_rotated() {
            return self.revoke_family(&stored, now).await;
        }

        if !stored.is_active_at(now) {
            tracing::debug!("Refresh token for user {} is expired or revoked", user.id);
            return Ok(RotationResult::Invalid);
        }

        // Minted before the rotation commits so nothing can fail once the old token is spent
        let access_token = issue_access_token(&user, &self.identity, &self.auth_service).await?;
        let replacement = generate_refresh_token(now, self.refresh_token_expiry)?.for_user(&user);

        let outcome = self
            .refresh_token_repo
            .rotate(&stored.token, replacement, now)
            .await
            .map_err(AppError::InternalServerError)?;

        match outcome {
            RotationOutcome::Rotated(new_token) => {
                tracing::info!("Rotated refresh token for user {}", user.id);
                Ok(RotationResult::Success(TokenPair::bearer(
                    access_token,
                    new_token.token,
                    self.access_token_expiry,
                )))
            }
            RotationOutcome::NotActive => {
                // Another request changed the row between our read and our write
                let current = self
                    .refresh_token_repo
                    .find_by_token(&stored.token)
                    .await
                    .map_err(AppError::InternalServerError)?;

                match current {
                    Some(current) if current.was_rotated() => {
                        self.revoke_family(&current, now).await
                    }
                    _ => Ok(RotationResult::Invalid),
                }
            }
        }
    }

    async fn revoke_family(
        &self,
        presented: &RefreshToken,
        now: OffsetDateTime,
    ) -> Result<RotationResult, AppError> {
        let revoked = self
            .refresh_token_repo
            .revoke_all_for_user(presented.user_id, now)
            .await
            .map_err(AppError::InternalServerError)?;

        tracing::warn!(
            "Refresh token reuse detected for user {}; revoked {} active token(s)",
            presented.user_id,
            revoked
        );

        Ok(RotationResult::Reused)
    }
}
