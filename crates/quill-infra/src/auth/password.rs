//! Argon2 password hashing implementation.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash as PhcHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};

use quill_core::domain::PasswordHash;
use quill_core::ports::{PasswordError, PasswordService};

/// Argon2id work factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordConfig {
    /// Load the work factor from `PASSWORD_*` variables, falling back to argon2's defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |key: &str, fallback: u32| {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(fallback)
        };

        Self {
            memory_kib: read("PASSWORD_MEMORY_KIB", defaults.memory_kib),
            iterations: read("PASSWORD_ITERATIONS", defaults.iterations),
            parallelism: read("PASSWORD_PARALLELISM", defaults.parallelism),
        }
    }
}

/// Argon2id password service with a fixed work factor.
///
/// Verification reads the parameters embedded in the stored hash, so hashes
/// made under an older work factor keep verifying after it is raised.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new(config: &PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| PasswordError::Hashing(format!("invalid argon2 parameters: {e}")))?;

        tracing::debug!(
            memory_kib = config.memory_kib,
            iterations = config.iterations,
            parallelism = config.parallelism,
            "Argon2 password service configured"
        );

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| PasswordHash::from_phc(h.to_string()))
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = PhcHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Hashing(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Argon2PasswordService {
        Argon2PasswordService::new(&PasswordConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let service = fast();
        let hash = service.hash("secret").unwrap();

        assert_ne!(hash.as_str(), "secret");
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(service.verify("secret", hash.as_str()).unwrap());
        assert!(!service.verify("wrong", hash.as_str()).unwrap());
    }

    #[test]
    fn same_password_gets_a_fresh_salt() {
        let service = fast();
        let a = service.hash("secret").unwrap();
        let b = service.hash("secret").unwrap();

        assert_ne!(a, b);
        assert!(service.verify("secret", a.as_str()).unwrap());
        assert!(service.verify("secret", b.as_str()).unwrap());
    }

    #[test]
    fn verify_uses_parameters_from_the_hash() {
        let hash = fast().hash("secret").unwrap();
        let default_service = Argon2PasswordService::default();

        assert!(default_service.verify("secret", hash.as_str()).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let err = fast().verify("secret", "secret").unwrap_err();
        assert!(matches!(err, PasswordError::MalformedHash(_)));
    }

    #[test]
    fn rejects_impossible_parameters() {
        let config = PasswordConfig {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        };
        assert!(Argon2PasswordService::new(&config).is_err());
    }
}
