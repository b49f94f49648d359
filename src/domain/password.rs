use anyhow::Result;

/// Trait for password hashing and verification
pub trait PasswordHashingService: Send + Sync {
    fn hash_password(&self, password: &str) -> Result<String>;
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Rules a new password must satisfy before an account is created
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

impl PasswordPolicy {
    /// Human readable list of every rule the password breaks; empty when it passes
    pub fn violations(&self, password: &str) -> Vec<String> {
        let mut problems = Vec::new();

        if password.chars().count() < self.min_length {
            problems.push(format!(
                "Passwords must be at least {} characters.",
                self.min_length
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            problems.push("Passwords must have at least one digit ('0'-'9').".to_string());
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            problems.push("Passwords must have at least one lowercase ('a'-'z').".to_string());
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            problems.push("Passwords must have at least one uppercase ('A'-'Z').".to_string());
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_alphanumeric()) {
            problems.push("Passwords must have at least one non alphanumeric character.".to_string());
        }

        problems
    }
}
