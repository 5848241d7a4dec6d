//! Password hashing and verification.

use crate::error::{StoreError, StoreResult};

/// Checks plaintext passwords against stored hashes.
pub trait PasswordVerifier: Send + Sync {
    /// Whether `password` matches `hash`. A malformed hash never matches.
    fn verify(&self, password: &str, hash: &str) -> bool;

    /// Hash a password for storage.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Hashing`] if the hasher fails.
    fn hash(&self, password: &str) -> StoreResult<String>;
}

/// bcrypt with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptVerifier {
    cost: u32,
}

impl BcryptVerifier {
    /// Lowest cost bcrypt accepts. Use only in tests.
    pub const MIN_COST: u32 = 4;

    /// Use the given cost.
    #[must_use]
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptVerifier {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordVerifier for BcryptVerifier {
    fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::debug!(error = %e, "stored password hash is malformed");
                false
            },
        }
    }

    fn hash(&self, password: &str) -> StoreResult<String> {
        bcrypt::hash(password, self.cost).map_err(|e| StoreError::Hashing(e.to_string()))
    }
}
