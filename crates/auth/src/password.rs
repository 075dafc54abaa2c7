//! Salted, adaptive password hashing (bcrypt).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// bcrypt with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    /// `cost` is the bcrypt log2 work factor (4..=31).
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(plain, self.cost)?)
    }

    /// `false` for a wrong password and for an unreadable stored hash.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        match bcrypt::verify(plain, hash) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is unreadable");
                false
            }
        }
    }
}
