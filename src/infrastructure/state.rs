use crate::application::auth::session::SessionService;
use crate::infrastructure::auth::JwtAuthService;
use crate::infrastructure::config::AuthSettings;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::identity::UserIdentityProvider;
use crate::infrastructure::password::PasswordService;
use crate::infrastructure::repositories::refresh_tokens::PostgresRefreshTokenRepository;
use crate::infrastructure::repositories::users::PostgresUserRepository;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub auth_service: Arc<JwtAuthService>,
    pub settings: Arc<AuthSettings>,
}

impl AppState {
    pub fn new(pool: DbPool, auth_service: Arc<JwtAuthService>, settings: AuthSettings) -> Self {
        Self {
            pool,
            auth_service,
            settings: Arc::new(settings),
        }
    }

    pub fn from_settings(pool: DbPool, settings: AuthSettings) -> anyhow::Result<Self> {
        let auth_service = Arc::new(JwtAuthService::from_settings(&settings)?);
        Ok(Self::new(pool, auth_service, settings))
    }

    /// Session service wired to the Postgres stores of this state
    pub fn session_service(&self) -> SessionService {
        let identity = Arc::new(UserIdentityProvider::new(
            Arc::new(PostgresUserRepository::new(self.pool.clone())),
            Arc::new(PasswordService::new()),
        ));
        let refresh_token_repo = Arc::new(PostgresRefreshTokenRepository::new(self.pool.clone()));

        SessionService::new(
            identity,
            refresh_token_repo,
            self.auth_service.clone(),
            self.settings.access_token_expiry,
            self.settings.refresh_token_expiry,
        )
    }
}
