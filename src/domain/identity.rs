use crate::domain::users::User;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Email '{0}' is already taken.")]
    DuplicateEmail(String),
    #[error("{}", .0.join(" "))]
    PasswordPolicy(Vec<String>),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Registration data handed to the identity provider
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub accepted_terms: bool,
}

/// Owner of user records, credentials and role membership.
///
/// The session core only looks users up through this trait and never touches
/// password hashes directly.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_user(&self, registration: NewRegistration) -> Result<User, IdentityError>;

    /// False for an unknown email as well as for a wrong password
    async fn verify_password(&self, email: &str, password: &str) -> anyhow::Result<bool>;

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn get_roles(&self, user: &User) -> anyhow::Result<Vec<String>>;

    async fn add_to_role(&self, user: &User, role: &str) -> anyhow::Result<()>;
}
