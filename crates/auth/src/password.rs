//! Secret hashing using Argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use libris_core::{DomainError, DomainResult};

use crate::config::AuthConfig;

/// Opaque one-way hash/verify capability.
///
/// Implementations must be cheap to share across tasks; the services hold one
/// behind an `Arc`.
pub trait SecretHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> DomainResult<String>;

    /// `Ok(false)` on mismatch; `Err` only when the digest itself is unusable.
    fn verify(&self, plaintext: &str, digest: &str) -> DomainResult<bool>;
}

/// Argon2id hasher producing PHC-format digests.
///
/// If a pepper is configured it is prepended to the secret before hashing and
/// verification, so digests are only portable between hashers sharing it.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
    pepper: Option<String>,
}

impl Argon2Hasher {
    pub fn new(pepper: Option<String>) -> Self {
        Self {
            argon2: Argon2::default(),
            pepper,
        }
    }

    /// Hasher with explicit memory (KiB) and iteration costs.
    pub fn with_cost(pepper: Option<String>, memory_kib: u32, iterations: u32) -> DomainResult<Self> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| DomainError::internal(format!("argon2 params: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            pepper,
        })
    }

    pub fn from_config(config: &AuthConfig) -> DomainResult<Self> {
        Self::with_cost(config.pepper.clone(), config.hash_memory_kib, config.hash_iterations)
    }

    fn peppered(&self, plaintext: &str) -> String {
        match &self.pepper {
            Some(p) => format!("{p}{plaintext}"),
            None => plaintext.to_string(),
        }
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(self.peppered(plaintext).as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| DomainError::internal(format!("hash error: {e}")))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> DomainResult<bool> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| DomainError::internal(format!("invalid hash format: {e}")))?;
        match self
            .argon2
            .verify_password(self.peppered(plaintext).as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(DomainError::internal(format!("verify error: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap(pepper: Option<&str>) -> Argon2Hasher {
        Argon2Hasher::with_cost(pepper.map(str::to_string), 8, 1).unwrap()
    }

    #[test]
    fn correct_secret_matches() {
        let h = cheap(None);
        let digest = h.hash("hunter22").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(h.verify("hunter22", &digest).unwrap());
    }

    #[test]
    fn wrong_secret_does_not_match() {
        let h = cheap(None);
        let digest = h.hash("hunter22").unwrap();
        assert!(!h.verify("wrong", &digest).unwrap());
    }

    #[test]
    fn pepper_is_applied() {
        let digest = cheap(Some("pepper!")).hash("hunter22").unwrap();
        assert!(cheap(Some("pepper!")).verify("hunter22", &digest).unwrap());
        assert!(!cheap(None).verify("hunter22", &digest).unwrap());
    }

    #[test]
    fn same_secret_hashes_differently() {
        let h = cheap(None);
        assert_ne!(h.hash("hunter22").unwrap(), h.hash("hunter22").unwrap());
    }

    #[test]
    fn malformed_digest_is_internal_error() {
        let err = cheap(None).verify("pw", "not-a-hash").unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
