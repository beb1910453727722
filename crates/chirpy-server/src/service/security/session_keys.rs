//! Shared-secret keys for signing and verifying session tokens.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};

use crate::utility::tracing_targets::TRACING_TARGET_SESSION_KEYS;
use crate::{Error, Result};

/// Minimum accepted length of the session signing secret, in bytes.
pub const MIN_SECRET_LENGTH: usize = 16;

/// Session signing secret configuration.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SessionKeysConfig {
    /// Server-held secret used to sign session tokens with HMAC-SHA256.
    #[cfg_attr(feature = "config", arg(long = "session-secret", env = "SECRET_STRING"))]
    pub session_secret: String,
}

impl SessionKeysConfig {
    /// Creates a new configuration from a secret.
    pub fn new(session_secret: impl Into<String>) -> Self {
        Self {
            session_secret: session_secret.into(),
        }
    }

    /// Validates the secret length.
    pub fn validate(&self) -> Result<()> {
        if self.session_secret.len() < MIN_SECRET_LENGTH {
            return Err(Error::auth(format!(
                "session secret must be at least {MIN_SECRET_LENGTH} bytes long"
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for SessionKeysConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeysConfig")
            .field("session_secret", &"[REDACTED]")
            .finish()
    }
}

/// Keys used to sign and verify session tokens.
///
/// Both keys are derived from the same server secret.
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<SessionKeysInner>,
}

struct SessionKeysInner {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
}

impl SessionKeys {
    /// Derives session keys from the configured secret.
    pub fn from_config(config: &SessionKeysConfig) -> Result<Self> {
        config.validate()?;
        let keys = Self::new(config.session_secret.as_bytes());

        tracing::info!(
            target: TRACING_TARGET_SESSION_KEYS,
            "session signing keys initialized"
        );

        Ok(keys)
    }

    /// Derives session keys from raw secret bytes without length checks.
    pub fn new(secret: &[u8]) -> Self {
        let inner = Arc::new(SessionKeysInner {
            decoding_key: DecodingKey::from_secret(secret),
            encoding_key: EncodingKey::from_secret(secret),
        });

        Self { inner }
    }

    /// Returns the key used to verify session tokens.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    /// Returns the key used to sign session tokens.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}
