//! In-process repositories used by tests and local tooling.
//!
//! Each repository keeps its rows behind a single mutex, so every trait call is
//! one critical section. That gives `rotate` the same all-or-nothing behavior
//! as the Postgres transaction.

use crate::domain::auth::{NewRefreshToken, RefreshToken, RefreshTokenRepository, RotationOutcome};
use crate::domain::users::{NewUser, User, UserRepository};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use time::OffsetDateTime;
use uuid::Uuid;

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| anyhow!("{} store lock poisoned", what))
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<Vec<User>>>,
    roles: Arc<Mutex<HashMap<Uuid, BTreeSet<String>>>>,
}

impl InMemoryUserRepository {
    /// Remove a user and their roles. Refresh tokens live in a separate store
    /// and are left in place, so they become orphaned rather than cascaded.
    pub fn delete(&self, id: Uuid) -> Result<bool> {
        let mut users = lock(&self.users, "user")?;
        let before = users.len();
        users.retain(|u| u.id != id);
        lock(&self.roles, "role")?.remove(&id);
        Ok(users.len() != before)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<Option<User>> {
        let mut users = lock(&self.users, "user")?;
        if users.iter().any(|u| u.email == new_user.email) {
            return Ok(None);
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            display_name: new_user.display_name,
            password_hash: new_user.password_hash,
            accepted_terms: new_user.accepted_terms,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(Some(user))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = lock(&self.users, "user")?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = lock(&self.users, "user")?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_roles(&self, user_id: Uuid) -> Result<Vec<String>> {
        let roles = lock(&self.roles, "role")?;
        Ok(roles
            .get(&user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn add_to_role(&self, user_id: Uuid, role: &str) -> Result<()> {
        lock(&self.roles, "role")?
            .entry(user_id)
            .or_default()
            .insert(role.to_string());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: Arc<Mutex<HashMap<String, RefreshToken>>>,
}

impl InMemoryRefreshTokenRepository {
    /// Every stored row, including revoked ones
    pub fn all(&self) -> Result<Vec<RefreshToken>> {
        Ok(lock(&self.tokens, "refresh token")?.values().cloned().collect())
    }
}

fn insert_new(
    tokens: &mut HashMap<String, RefreshToken>,
    token: NewRefreshToken,
    now: OffsetDateTime,
) -> Result<RefreshToken> {
    if tokens.contains_key(&token.token) {
        return Err(anyhow!("duplicate refresh token value"));
    }

    let row = RefreshToken {
        id: Uuid::new_v4(),
        user_id: token.user_id,
        token: token.token,
        created_at: now,
        expires_at: token.expires_at,
        revoked_at: None,
        replaced_by_token: None,
    };
    tokens.insert(row.token.clone(), row.clone());
    Ok(row)
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken> {
        let mut tokens = lock(&self.tokens, "refresh token")?;
        insert_new(&mut tokens, token, OffsetDateTime::now_utc())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        Ok(lock(&self.tokens, "refresh token")?.get(token).cloned())
    }

    async fn find_active_by_user_id(
        &self,
        user_id: Uuid,
        now: OffsetDateTime,
    ) -> Result<Vec<RefreshToken>> {
        let tokens = lock(&self.tokens, "refresh token")?;
        let mut active: Vec<RefreshToken> = tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_active_at(now))
            .cloned()
            .collect();
        active.sort_by_key(|t| t.created_at);
        Ok(active)
    }

    async fn rotate(
        &self,
        presented: &str,
        replacement: NewRefreshToken,
        now: OffsetDateTime,
    ) -> Result<RotationOutcome> {
        let mut tokens = lock(&self.tokens, "refresh token")?;

        match tokens.get(presented) {
            Some(current) if current.is_active_at(now) => {}
            _ => return Ok(RotationOutcome::NotActive),
        }

        let replacement_token = replacement.token.clone();
        let new_row = insert_new(&mut tokens, replacement, now)?;

        if let Some(current) = tokens.get_mut(presented) {
            current.revoked_at = Some(now);
            current.replaced_by_token = Some(replacement_token);
        }

        Ok(RotationOutcome::Rotated(new_row))
    }

    async fn revoke(&self, token: &str, now: OffsetDateTime) -> Result<bool> {
        let mut tokens = lock(&self.tokens, "refresh token")?;
        match tokens.get_mut(token) {
            Some(row) if row.revoked_at.is_none() => {
                row.revoked_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: Uuid, now: OffsetDateTime) -> Result<u64> {
        let mut tokens = lock(&self.tokens, "refresh token")?;
        let mut revoked = 0;
        for row in tokens
            .values_mut()
            .filter(|t| t.user_id == user_id && t.is_active_at(now))
        {
            row.revoked_at = Some(now);
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn delete_expired_before(&self, cutoff: OffsetDateTime) -> Result<u64> {
        let mut tokens = lock(&self.tokens, "refresh token")?;
        let before = tokens.len();
        tokens.retain(|_, t| t.expires_at > cutoff);
        Ok((before - tokens.len()) as u64)
    }
}
