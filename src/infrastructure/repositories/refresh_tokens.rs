use crate::domain::auth::{NewRefreshToken, RefreshToken, RefreshTokenRepository, RotationOutcome};
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::models::auth::RefreshTokenDbModel;
use anyhow::Result;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

const COLUMNS: &str = "id, user_id, token, created_at, expires_at, revoked_at, replaced_by_token";

pub struct PostgresRefreshTokenRepository {
    pool: DbPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken> {
        let token_db = sqlx::query_as::<_, RefreshTokenDbModel>(&format!(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(token.user_id)
        .bind(&token.token)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(token_db.into())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let token_db = sqlx::query_as::<_, RefreshTokenDbModel>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM refresh_tokens
            WHERE token = $1
            "#
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token_db.map(Into::into))
    }

    async fn find_active_by_user_id(
        &self,
        user_id: Uuid,
        now: OffsetDateTime,
    ) -> Result<Vec<RefreshToken>> {
        let tokens = sqlx::query_as::<_, RefreshTokenDbModel>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM refresh_tokens
            WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > $2
            ORDER BY created_at
            "#
        ))
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens.into_iter().map(Into::into).collect())
    }

    async fn rotate(
        &self,
        presented: &str,
        replacement: NewRefreshToken,
        now: OffsetDateTime,
    ) -> Result<RotationOutcome> {
        let mut tx = self.pool.begin().await?;

        // The row lock taken here serializes concurrent rotations of the same
        // token; the loser re-evaluates the predicate and matches nothing.
        let revoked = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $2, replaced_by_token = $3
            WHERE token = $1 AND revoked_at IS NULL AND expires_at > $2
            "#,
        )
        .bind(presented)
        .bind(now)
        .bind(&replacement.token)
        .execute(&mut *tx)
        .await?;

        if revoked.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(RotationOutcome::NotActive);
        }

        let token_db = sqlx::query_as::<_, RefreshTokenDbModel>(&format!(
            r#"
            INSERT INTO refresh_tokens (user_id, token, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(replacement.user_id)
        .bind(&replacement.token)
        .bind(now)
        .bind(replacement.expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RotationOutcome::Rotated(token_db.into()))
    }

    async fn revoke(&self, token: &str, now: OffsetDateTime) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $2
            WHERE token = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(token)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_user(&self, user_id: Uuid, now: OffsetDateTime) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $2
            WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > $2
            "#,
        )
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired_before(&self, cutoff: OffsetDateTime) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE expires_at <= $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
