use crate::application::auth::token_utils::{TokenPair, generate_and_store_tokens};
use crate::domain::auth::{AuthService, RefreshTokenRepository};
use crate::domain::identity::IdentityProvider;
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "viewer@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

pub type LoginResponse = TokenPair;

pub struct LoginUseCase {
    identity: Arc<dyn IdentityProvider>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    auth_service: Arc<dyn AuthService>,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl LoginUseCase {
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

    /// Existing sessions of the user stay valid; every login opens a new one.
    #[tracing::instrument(skip(self, req), fields(email = %req.email))]
    pub async fn execute(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let valid_password = self
            .identity
            .verify_password(&req.email, &req.password)
            .await
            .map_err(|e| {
                tracing::error!("Credential check failed: {}", e);
                AppError::InternalServerError(e)
            })?;

        if !valid_password {
            tracing::warn!("Login rejected");
            return Err(AppError::InvalidCredentials);
        }

        let user = self
            .identity
            .find_user_by_email(&req.email)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or(AppError::InvalidCredentials)?;

        let tokens = generate_and_store_tokens(
            &user,
            &self.identity,
            &self.auth_service,
            &self.refresh_token_repo,
            self.access_token_expiry,
            self.refresh_token_expiry,
        )
        .await?;

        tracing::info!("User {} logged in", user.id);
        Ok(tokens)
    }
}
