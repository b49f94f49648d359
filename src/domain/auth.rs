use crate::domain::users::User;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// One entry per role assigned at issuance time
    #[serde(rename = "role", default)]
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    pub fn new_access_token(
        user: &User,
        roles: Vec<String>,
        issuer: &str,
        audience: &str,
        issued_at: OffsetDateTime,
        expiry_seconds: i64,
    ) -> Result<Self> {
        let now = issued_at.unix_timestamp();
        let exp = now.checked_add(expiry_seconds).ok_or_else(|| {
            anyhow::anyhow!("Access token expiry of {}s overflows", expiry_seconds)
        })?;

        Ok(Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            roles,
            iss: issuer.to_string(),
            aud: audience.to_string(),
            iat: now,
            exp,
        })
    }

    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow::anyhow!("Invalid user ID in claims: {}", e))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Refresh token entity.
///
/// `token` is the bearer credential and the lookup key. A row is written once
/// and then mutated at most once: either revoked on logout (no replacement) or
/// revoked with `replaced_by_token` set when it is rotated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub revoked_at: Option<OffsetDateTime>,
    pub replaced_by_token: Option<String>,
}

impl RefreshToken {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    pub fn is_active_at(&self, now: OffsetDateTime) -> bool {
        self.revoked_at.is_none() && !self.is_expired_at(now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(OffsetDateTime::now_utc())
    }

    /// Revoked as part of a rotation. Presenting such a token again is reuse.
    pub fn was_rotated(&self) -> bool {
        self.revoked_at.is_some() && self.replaced_by_token.is_some()
    }
}

/// New refresh token for creation
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: OffsetDateTime,
}

/// Result of an atomic rotate attempt against the store
#[derive(Debug, Clone)]
pub enum RotationOutcome {
    /// The presented token was active and is now revoked and linked to this new row
    Rotated(RefreshToken),
    /// The presented token was missing, revoked or expired when the write was attempted
    NotActive,
}

/// Repository trait for refresh tokens
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Create a new refresh token
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken>;

    /// Find a refresh token by its value, whatever its state
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>>;

    /// All tokens of a user that are still active at `now`
    async fn find_active_by_user_id(
        &self,
        user_id: Uuid,
        now: OffsetDateTime,
    ) -> Result<Vec<RefreshToken>>;

    /// Revoke `presented` and insert `replacement` as one atomic unit.
    ///
    /// The revocation is conditional on `presented` still being active at
    /// `now`; when it is not, nothing is written and `NotActive` is returned.
    async fn rotate(
        &self,
        presented: &str,
        replacement: NewRefreshToken,
        now: OffsetDateTime,
    ) -> Result<RotationOutcome>;

    /// Revoke a single token without a replacement link.
    /// Returns false when the token is unknown or already revoked.
    async fn revoke(&self, token: &str, now: OffsetDateTime) -> Result<bool>;

    /// Revoke every active token of a user in one statement
    async fn revoke_all_for_user(&self, user_id: Uuid, now: OffsetDateTime) -> Result<u64>;

    /// Delete tokens that expired before `cutoff`
    async fn delete_expired_before(&self, cutoff: OffsetDateTime) -> Result<u64>;
}

/// Auth service trait for JWT operations
pub trait AuthService: Send + Sync {
    /// Generate an access token for a user with the given roles
    fn generate_access_token(&self, user: &User, roles: Vec<String>) -> Result<String>;

    /// Validate and decode an access token
    fn validate_access_token(&self, token: &str) -> Result<Claims>;
}
