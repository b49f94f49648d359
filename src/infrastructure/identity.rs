use crate::domain::identity::{IdentityError, IdentityProvider, NewRegistration};
use crate::domain::password::{PasswordHashingService, PasswordPolicy};
use crate::domain::users::{NewUser, User, UserRepository};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Identity provider backed by a user repository and an argon2 hasher
#[derive(Clone)]
pub struct UserIdentityProvider {
    user_repo: Arc<dyn UserRepository>,
    password_service: Arc<dyn PasswordHashingService>,
    policy: PasswordPolicy,
}

impl UserIdentityProvider {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        password_service: Arc<dyn PasswordHashingService>,
    ) -> Self {
        Self {
            user_repo,
            password_service,
            policy: PasswordPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Emails are compared case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl IdentityProvider for UserIdentityProvider {
    #[tracing::instrument(skip(self, registration), fields(email = %registration.email))]
    async fn create_user(&self, registration: NewRegistration) -> Result<User, IdentityError> {
        let email = normalize_email(&registration.email);

        let problems = self.policy.violations(&registration.password);
        if !problems.is_empty() {
            tracing::debug!("Password rejected by policy ({} rules)", problems.len());
            return Err(IdentityError::PasswordPolicy(problems));
        }

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(IdentityError::DuplicateEmail(email));
        }

        let password_hash = self.password_service.hash_password(&registration.password)?;

        let new_user = NewUser {
            email: email.clone(),
            display_name: registration.display_name.trim().to_string(),
            password_hash,
            accepted_terms: registration.accepted_terms,
        };

        // A concurrent registration can still win between the lookup and the insert
        self.user_repo
            .create(new_user)
            .await?
            .ok_or(IdentityError::DuplicateEmail(email))
    }

    async fn verify_password(&self, email: &str, password: &str) -> anyhow::Result<bool> {
        let Some(user) = self.user_repo.find_by_email(&normalize_email(email)).await? else {
            return Ok(false);
        };

        self.password_service
            .verify_password(password, &user.password_hash)
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        self.user_repo.find_by_id(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.user_repo.find_by_email(&normalize_email(email)).await
    }

    async fn get_roles(&self, user: &User) -> anyhow::Result<Vec<String>> {
        self.user_repo.get_roles(user.id).await
    }

    async fn add_to_role(&self, user: &User, role: &str) -> anyhow::Result<()> {
        self.user_repo.add_to_role(user.id, role).await
    }
}
