//! Password credentials: salted Argon2id hashes, constant-time verification.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use thiserror::Error;

/// A stored credential: an Argon2 hash in PHC string format.
///
/// The plaintext never lives in this type. `Debug` is redacted so a user row
/// can be logged without leaking the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a PHC string read from storage. Use [`CredentialHasher::hash`] for
    /// new credentials.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_phc(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("invalid argon2 parameters: {0}")]
    Params(String),

    #[error("credential hashing failed: {0}")]
    Hash(String),

    #[error("stored credential is not a valid PHC string: {0}")]
    Malformed(String),
}

/// Hashes and verifies credentials with Argon2id.
///
/// Verification reads the cost parameters from the stored hash, so a hasher
/// with cheap parameters (tests) still verifies hashes produced with the
/// defaults and vice versa.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Argon2id v0x13 with the crate's default cost.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Argon2id with explicit cost (memory in KiB, iterations, lanes).
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| CredentialError::Params(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Cheapest parameters Argon2 accepts. Only for tests and fixtures.
    pub fn insecure_fast() -> Self {
        let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
            .unwrap_or_default();
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a plaintext secret under a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<Credential, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;
        Ok(Credential(hash.to_string()))
    }

    /// Check `plaintext` against a stored credential.
    ///
    /// The final digest comparison is constant-time. `Ok(false)` means the
    /// secret did not match; `Err` means the stored value itself is unusable.
    pub fn verify(&self, credential: &Credential, plaintext: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(credential.as_phc())
            .map_err(|e| CredentialError::Malformed(e.to_string()))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::Malformed(e.to_string())),
        }
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = CredentialHasher::insecure_fast();
        let credential = hasher.hash("s3cret").unwrap();

        assert!(credential.as_phc().starts_with("$argon2id$"));
        assert!(hasher.verify(&credential, "s3cret").unwrap());
        assert!(!hasher.verify(&credential, "S3cret").unwrap());
    }

    #[test]
    fn same_secret_hashes_differently() {
        let hasher = CredentialHasher::insecure_fast();
        let a = hasher.hash("s3cret").unwrap();
        let b = hasher.hash("s3cret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn plaintext_in_storage_is_rejected_not_matched() {
        let hasher = CredentialHasher::insecure_fast();
        let legacy = Credential::from_phc("s3cret");

        assert!(matches!(hasher.verify(&legacy, "s3cret"), Err(CredentialError::Malformed(_))));
    }

    #[test]
    fn debug_output_is_redacted() {
        let credential = CredentialHasher::insecure_fast().hash("s3cret").unwrap();
        assert_eq!(format!("{credential:?}"), "Credential(<redacted>)");
    }
}
