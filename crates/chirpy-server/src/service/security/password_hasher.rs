//! Password hashing and verification using Argon2id.
//!
//! Hashes are produced in PHC string format, so the algorithm, parameters and
//! salt travel with the stored value and verification uses whatever
//! parameters the hash was created with.

use std::sync::Arc;

use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};

use crate::utility::tracing_targets::TRACING_TARGET_PASSWORD_HASHER;

/// Number of random salt bytes generated per hash.
const SALT_LENGTH: usize = 16;

/// Errors produced while hashing or verifying passwords.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    /// The plaintext password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// The password does not match the stored hash.
    #[error("password does not match")]
    Mismatch,
    /// The stored hash is not a valid PHC string.
    #[error("stored password hash is malformed")]
    MalformedHash,
    /// The Argon2 parameters were rejected.
    #[error("invalid password hashing parameters: {0}")]
    InvalidParams(String),
    /// Hashing failed for an unexpected reason.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Argon2id password hasher.
///
/// Cheap to clone. Holds a pre-computed hash used by
/// [`verify_dummy_password`](Self::verify_dummy_password) so that lookups for
/// unknown accounts perform the same amount of work as real verifications.
#[derive(Clone)]
pub struct PasswordHasher {
    inner: Arc<PasswordHasherInner>,
}

struct PasswordHasherInner {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl PasswordHasher {
    /// Creates a hasher with the given memory cost (KiB) and iteration count.
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let dummy_password: [u8; 32] = rand::random();
        let dummy_hash = hash_with(&argon2, &dummy_password)?;

        tracing::debug!(
            target: TRACING_TARGET_PASSWORD_HASHER,
            memory_kib,
            iterations,
            "password hasher initialized"
        );

        Ok(Self {
            inner: Arc::new(PasswordHasherInner { argon2, dummy_hash }),
        })
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::EmptyPassword);
        }

        hash_with(&self.inner.argon2, password.as_bytes())
    }

    /// Verifies a password against a stored PHC hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<(), PasswordError> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET_PASSWORD_HASHER,
                error = %e,
                "stored password hash is malformed"
            );
            PasswordError::MalformedHash
        })?;

        match self
            .inner
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(()),
            Err(ArgonError::Password) => Err(PasswordError::Mismatch),
            Err(
                e @ (ArgonError::Algorithm
                | ArgonError::Version
                | ArgonError::B64Encoding(_)
                | ArgonError::OutputSize { .. }
                | ArgonError::ParamNameDuplicated
                | ArgonError::ParamNameInvalid
                | ArgonError::ParamValueInvalid(_)
                | ArgonError::ParamsMaxExceeded
                | ArgonError::PhcStringField
                | ArgonError::PhcStringTrailingData
                | ArgonError::SaltInvalid(_)),
            ) => {
                // Parses as PHC but is not a usable Argon2 hash.
                tracing::warn!(
                    target: TRACING_TARGET_PASSWORD_HASHER,
                    error = %e,
                    "stored password hash is not a usable argon2 hash"
                );
                Err(PasswordError::MalformedHash)
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_PASSWORD_HASHER,
                    error = %e,
                    "password verification failed unexpectedly"
                );
                Err(PasswordError::Hashing(e.to_string()))
            }
        }
    }

    /// Returns `true` if the password matches the stored hash.
    ///
    /// Mismatches and malformed hashes both yield `false`.
    pub fn is_valid(&self, password: &str, stored_hash: &str) -> bool {
        self.verify_password(password, stored_hash).is_ok()
    }

    /// Performs a verification against a throwaway hash and discards the result.
    pub fn verify_dummy_password(&self, password: &str) {
        let _ = self.verify_password(password, &self.inner.dummy_hash);
    }

    /// Hashes a password on the blocking thread pool.
    pub async fn spawn_hash_password(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| PasswordError::Hashing(e.to_string()))?
    }

    /// Verifies a password on the blocking thread pool.
    pub async fn spawn_verify_password(
        &self,
        password: String,
        stored_hash: String,
    ) -> Result<(), PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &stored_hash))
            .await
            .map_err(|e| PasswordError::Hashing(e.to_string()))?
    }

    /// Runs [`verify_dummy_password`](Self::verify_dummy_password) on the blocking thread pool.
    pub async fn spawn_verify_dummy_password(&self, password: String) {
        let hasher = self.clone();
        let _ = tokio::task::spawn_blocking(move || hasher.verify_dummy_password(&password)).await;
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.inner.argon2.params())
            .finish_non_exhaustive()
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &[u8]) -> Result<String, PasswordError> {
    let salt_bytes: [u8; SALT_LENGTH] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;

    let password_hash = argon2.hash_password(password, &salt).map_err(|e| {
        tracing::error!(
            target: TRACING_TARGET_PASSWORD_HASHER,
            error = %e,
            "password hashing operation failed"
        );
        PasswordError::Hashing(e.to_string())
    })?;

    Ok(password_hash.to_string())
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    // Minimum Argon2 cost keeps the test suite fast.
    PasswordHasher::new(8, 1).expect("valid test parameters")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_password() -> anyhow::Result<()> {
        let hasher = test_hasher();
        let hash = hasher.hash_password("04234")?;

        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(hasher.verify_password("04234", &hash), Ok(()));
        assert_eq!(
            hasher.verify_password("wrong", &hash),
            Err(PasswordError::Mismatch)
        );
        assert!(hasher.is_valid("04234", &hash));
        assert!(!hasher.is_valid("wrong", &hash));

        Ok(())
    }

    #[test]
    fn hash_produces_unique_salts() -> anyhow::Result<()> {
        let hasher = test_hasher();

        let first = hasher.hash_password("password")?;
        let second = hasher.hash_password("password")?;

        assert_ne!(first, second);
        assert!(hasher.verify_password("password", &first).is_ok());
        assert!(hasher.verify_password("password", &second).is_ok());

        Ok(())
    }

    #[test]
    fn empty_password_is_rejected() {
        let hasher = test_hasher();
        assert_eq!(hasher.hash_password(""), Err(PasswordError::EmptyPassword));
    }

    #[test]
    fn malformed_hash_is_reported() {
        let hasher = test_hasher();
        assert_eq!(
            hasher.verify_password("password", "not_a_phc_string"),
            Err(PasswordError::MalformedHash)
        );
    }

    #[test]
    fn foreign_phc_hash_is_malformed() {
        let hasher = test_hasher();
        let foreign = [
            "$pbkdf2-sha256$i=1000$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA",
            "$argon2id$v=19$x=8,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA",
            "$argon2id$v=99$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA",
        ];

        for stored_hash in foreign {
            assert_eq!(
                hasher.verify_password("password", stored_hash),
                Err(PasswordError::MalformedHash),
                "{stored_hash}"
            );
            assert!(!hasher.is_valid("password", stored_hash));
        }
    }

    #[test]
    fn invalid_params_are_rejected() {
        assert!(matches!(
            PasswordHasher::new(0, 0),
            Err(PasswordError::InvalidParams(_))
        ));
    }

    #[test]
    fn hashes_verify_with_embedded_params() -> anyhow::Result<()> {
        let cheap = test_hasher();
        let other = PasswordHasher::new(16, 2)?;
        let hash = cheap.hash_password("password")?;

        assert!(other.verify_password("password", &hash).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn spawned_hash_and_verify() -> anyhow::Result<()> {
        let hasher = test_hasher();
        let hash = hasher.spawn_hash_password("password".to_owned()).await?;

        hasher
            .spawn_verify_password("password".to_owned(), hash)
            .await?;
        hasher.spawn_verify_dummy_password("password".to_owned()).await;

        Ok(())
    }
}
