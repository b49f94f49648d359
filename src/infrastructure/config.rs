use anyhow::Result;
use std::env;
use std::str::FromStr;

/// Server-side token settings. Nothing here is ever taken from a request.
#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    /// Access token lifetime in seconds
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,
    /// How long expired refresh tokens are kept for reuse detection
    pub refresh_token_retention_days: i64,
}

impl AuthSettings {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;

        Ok(Self {
            jwt_secret,
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "showtracker".to_string()),
            audience: env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "showtracker-clients".to_string()),
            access_token_expiry: env_in_range(
                "JWT_ACCESS_TOKEN_EXPIRY",
                900,
                MAX_ACCESS_TOKEN_EXPIRY,
            )?,
            refresh_token_expiry: env_in_range(
                "JWT_REFRESH_TOKEN_EXPIRY",
                604800,
                MAX_REFRESH_TOKEN_EXPIRY,
            )?,
            refresh_token_retention_days: env_in_range(
                "REFRESH_TOKEN_RETENTION_DAYS",
                30,
                MAX_RETENTION_DAYS,
            )?,
        })
    }
}

/// One day
pub const MAX_ACCESS_TOKEN_EXPIRY: i64 = 86_400;
/// One year
pub const MAX_REFRESH_TOKEN_EXPIRY: i64 = 365 * 86_400;
pub const MAX_RETENTION_DAYS: i64 = 3650;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Like `env_or`, but a parsed value outside `1..=max` is a startup error
fn env_in_range(key: &str, default: i64, max: i64) -> Result<i64> {
    let value = env_or(key, default);
    if !(1..=max).contains(&value) {
        anyhow::bail!("{} must be between 1 and {}, got {}", key, max, value);
    }
    Ok(value)
}
