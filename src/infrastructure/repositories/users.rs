use crate::domain::users::{NewUser, User, UserRepository};
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::models::users::UserDbModel;
use async_trait::async_trait;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: DbPool,
}

impl PostgresUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, UserDbModel>(
            r#"
            INSERT INTO users (email, display_name, password_hash, accepted_terms)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, display_name, password_hash, accepted_terms, created_at, updated_at
            "#,
        )
        .bind(new_user.email)
        .bind(new_user.display_name)
        .bind(new_user.password_hash)
        .bind(new_user.accepted_terms)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user.map(Into::into))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, UserDbModel>(
            r#"
            SELECT id, email, display_name, password_hash, accepted_terms, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, UserDbModel>(
            r#"
            SELECT id, email, display_name, password_hash, accepted_terms, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user.map(Into::into))
    }

    async fn get_roles(&self, user_id: Uuid) -> Result<Vec<String>, anyhow::Error> {
        let roles = sqlx::query_scalar::<_, String>(
            r#"
            SELECT role
            FROM user_roles
            WHERE user_id = $1
            ORDER BY role
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    async fn add_to_role(&self, user_id: Uuid, role: &str) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
