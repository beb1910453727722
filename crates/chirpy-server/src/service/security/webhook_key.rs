//! Verification of the API key presented by the payment provider webhook.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Webhook API key configuration.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct WebhookConfig {
    /// API key the payment provider sends in the `Authorization: ApiKey` header.
    #[cfg_attr(feature = "config", arg(long = "polka-key", env = "POLKA_KEY"))]
    pub polka_key: String,
}

impl WebhookConfig {
    /// Creates a new configuration from an API key.
    pub fn new(polka_key: impl Into<String>) -> Self {
        Self {
            polka_key: polka_key.into(),
        }
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("polka_key", &"[REDACTED]")
            .finish()
    }
}

/// The configured webhook API key.
///
/// Only the SHA-256 digest of the key is retained, and presented keys are
/// compared digest to digest in constant time.
#[derive(Clone)]
pub struct WebhookKey {
    digest: Arc<[u8; 32]>,
}

impl WebhookKey {
    /// Creates a webhook key from the configuration.
    pub fn from_config(config: &WebhookConfig) -> Result<Self> {
        if config.polka_key.trim().is_empty() {
            return Err(Error::auth("webhook api key must not be empty"));
        }

        Ok(Self::new(&config.polka_key))
    }

    /// Creates a webhook key from its plaintext value.
    pub fn new(key: &str) -> Self {
        Self {
            digest: Arc::new(Sha256::digest(key.as_bytes()).into()),
        }
    }

    /// Returns `true` if the presented key equals the configured key.
    pub fn verify(&self, presented: &str) -> bool {
        let presented: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
        self.digest
            .iter()
            .zip(presented.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for WebhookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookKey").finish_non_exhaustive()
    }
}
