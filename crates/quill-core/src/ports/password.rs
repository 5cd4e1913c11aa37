//! Credential hashing port.

use crate::domain::PasswordHash;

/// One-way salted password hashing.
///
/// Implementations are CPU bound; callers in async code should run them on
/// a blocking thread.
pub trait PasswordService: Send + Sync {
    /// Hash a plaintext password with a fresh random salt.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordError>;

    /// Check a plaintext candidate against a stored hash.
    ///
    /// A mismatch is `Ok(false)`, never an error.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Stored hash is malformed: {0}")]
    MalformedHash(String),
}
