use crate::application::auth::token_utils::{TokenPair, generate_and_store_tokens};
use crate::domain::auth::{AuthService, RefreshTokenRepository};
use crate::domain::identity::{IdentityError, IdentityProvider, NewRegistration};
use crate::domain::users::{DEFAULT_ROLE, User};
use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "viewer@example.com")]
    pub email: String,

    /// Strength rules are enforced by the identity provider
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "Secret1!")]
    pub password: String,

    #[validate(length(
        min = 1,
        max = 100,
        message = "Display name must be between 1 and 100 characters"
    ))]
    #[schema(example = "Binge Watcher")]
    pub display_name: String,

    #[serde(default)]
    pub accepted_terms: bool,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegisterResponse {
    pub user: UserSummary,
    pub tokens: TokenPair,
}

pub struct RegisterUseCase {
    identity: Arc<dyn IdentityProvider>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    auth_service: Arc<dyn AuthService>,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl RegisterUseCase {
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

    #[tracing::instrument(skip(self, req), fields(email = %req.email))]
    pub async fn execute(&self, req: RegisterRequest) -> Result<RegisterResponse, AppError> {
        let registration = NewRegistration {
            email: req.email,
            password: req.password,
            display_name: req.display_name,
            accepted_terms: req.accepted_terms,
        };

        let user = self
            .identity
            .create_user(registration)
            .await
            .map_err(|e| match e {
                IdentityError::Store(e) => AppError::InternalServerError(e),
                rejected => {
                    tracing::info!("Registration rejected: {}", rejected);
                    AppError::RegistrationFailed(rejected.to_string())
                }
            })?;

        self.identity
            .add_to_role(&user, DEFAULT_ROLE)
            .await
            .map_err(AppError::InternalServerError)?;

        let tokens = generate_and_store_tokens(
            &user,
            &self.identity,
            &self.auth_service,
            &self.refresh_token_repo,
            self.access_token_expiry,
            self.refresh_token_expiry,
        )
        .await?;

        tracing::info!("Registered user {}", user.id);

        Ok(RegisterResponse {
            user: UserSummary::from(&user),
            tokens,
        })
    }
}
