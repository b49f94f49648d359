use crate::application::auth::login::{LoginRequest, LoginResponse, LoginUseCase};
use crate::application::auth::logout::{LogoutRequest, LogoutUseCase};
use crate::application::auth::refresh::{RefreshTokenRequest, RefreshTokenUseCase, RotationResult};
use crate::application::auth::register::{RegisterRequest, RegisterResponse, RegisterUseCase};
use crate::domain::auth::{AuthService, RefreshTokenRepository};
use crate::domain::identity::IdentityProvider;
use crate::domain::users::User;
use crate::shared::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Entry point for every session operation, shared by the HTTP layer and tests.
pub struct SessionService {
    identity: Arc<dyn IdentityProvider>,
    register: RegisterUseCase,
    login: LoginUseCase,
    refresh: RefreshTokenUseCase,
    logout: LogoutUseCase,
}

impl SessionService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
        auth_service: Arc<dyn AuthService>,
        access_token_expiry: i64,
        refresh_token_expiry: i64,
    ) -> Self {
        Self {
            register: RegisterUseCase::new(
                identity.clone(),
                refresh_token_repo.clone(),
                auth_service.clone(),
                access_token_expiry,
                refresh_token_expiry,
            ),
            login: LoginUseCase::new(
                identity.clone(),
                refresh_token_repo.clone(),
                auth_service.clone(),
                access_token_expiry,
                refresh_token_expiry,
            ),
            refresh: RefreshTokenUseCase::new(
                identity.clone(),
                refresh_token_repo.clone(),
                auth_service,
                access_token_expiry,
                refresh_token_expiry,
            ),
            logout: LogoutUseCase::new(refresh_token_repo),
            identity,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, AppError> {
        self.register.execute(req).await
    }

    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        self.login.execute(req).await
    }

    pub async fn refresh(&self, req: RefreshTokenRequest) -> Result<RotationResult, AppError> {
        self.refresh.execute(req).await
    }

    pub async fn logout(&self, req: LogoutRequest) -> Result<(), AppError> {
        self.logout.execute(req).await
    }

    /// Current profile of an authenticated user
    pub async fn current_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.identity
            .find_user_by_id(user_id)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))
    }
}
