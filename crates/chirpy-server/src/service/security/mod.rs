//! Security services: password hashing, session signing keys and the
//! webhook API key.

mod password_hasher;
mod session_keys;
mod webhook_key;

#[cfg(test)]
pub(crate) use password_hasher::test_hasher;
pub use password_hasher::{PasswordError, PasswordHasher};
pub use session_keys::{MIN_SECRET_LENGTH, SessionKeys, SessionKeysConfig};
pub use webhook_key::{WebhookConfig, WebhookKey};
