use crate::domain::auth::{AuthService, NewRefreshToken, RefreshTokenRepository};
use crate::domain::identity::IdentityProvider;
use crate::domain::users::User;
use crate::shared::error::AppError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;

/// Random bytes behind every refresh token
pub const REFRESH_TOKEN_BYTES: usize = 64;

/// Access + refresh token pair handed to the caller
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl TokenPair {
    pub fn bearer(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// A freshly generated refresh token value, not yet bound to a user
#[derive(Debug, Clone)]
pub struct GeneratedRefreshToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

impl GeneratedRefreshToken {
    pub fn for_user(self, user: &User) -> NewRefreshToken {
        NewRefreshToken {
            user_id: user.id,
            token: self.token,
            expires_at: self.expires_at,
        }
    }
}

/// Draw a new refresh token from the OS CSPRNG.
///
/// Standard base64 with `+` and `/` swapped for `-` and `_`, padding kept.
pub fn generate_refresh_token(
    now: OffsetDateTime,
    expiry_seconds: i64,
) -> Result<GeneratedRefreshToken, AppError> {
    let expires_at = now
        .checked_add(time::Duration::seconds(expiry_seconds))
        .ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!(
                "Refresh token expiry of {}s is out of range",
                expiry_seconds
            ))
        })?;

    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);

    Ok(GeneratedRefreshToken {
        token: URL_SAFE.encode(bytes),
        expires_at,
    })
}

/// Mint an access token with the user's roles as they are right now
pub async fn issue_access_token(
    user: &User,
    identity: &Arc<dyn IdentityProvider>,
    auth_service: &Arc<dyn AuthService>,
) -> Result<String, AppError> {
    let roles = identity
        .get_roles(user)
        .await
        .map_err(AppError::InternalServerError)?;

    auth_service
        .generate_access_token(user, roles)
        .map_err(AppError::InternalServerError)
}

/// Generate and store a complete token pair (access + refresh tokens)
pub async fn generate_and_store_tokens(
    user: &User,
    identity: &Arc<dyn IdentityProvider>,
    auth_service: &Arc<dyn AuthService>,
    refresh_token_repo: &Arc<dyn RefreshTokenRepository>,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
) -> Result<TokenPair, AppError> {
    let access_token = issue_access_token(user, identity, auth_service).await?;

    let generated = generate_refresh_token(OffsetDateTime::now_utc(), refresh_token_expiry)?;

    let stored = refresh_token_repo
        .create(generated.for_user(user))
        .await
        .map_err(AppError::InternalServerError)?;

    Ok(TokenPair::bearer(
        access_token,
        stored.token,
        access_token_expiry,
    ))
}
