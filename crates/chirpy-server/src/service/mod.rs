//! Application state and dependency injection.

pub mod auth;
mod config;
mod content;
mod hit_counter;
mod platform;
mod security;

use std::sync::Arc;

use chirpy_postgres::PgClient;

pub use crate::service::auth::{AuthConfig, Authenticator, PgSessionStore, SystemClock};
pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::content::{ChirpError, MAX_CHIRP_LENGTH, ProfanityFilter};
pub use crate::service::hit_counter::HitCounter;
pub use crate::service::platform::Platform;
#[cfg(test)]
pub(crate) use crate::service::security::test_hasher;
pub use crate::service::security::{
    PasswordError, PasswordHasher, SessionKeys, SessionKeysConfig, WebhookConfig, WebhookKey,
};
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    // External services:
    pub postgres: PgClient,

    // Internal services:
    pub authenticator: Authenticator,
    pub password_hasher: PasswordHasher,
    pub profanity_filter: ProfanityFilter,
    pub hit_counter: HitCounter,
    pub webhook_key: WebhookKey,
    pub platform: Platform,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects to Postgres, applies migrations and derives key material.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let postgres = config.connect_postgres().await?;
        let password_hasher = config.create_password_hasher()?;
        let session_keys = config.load_session_keys()?;

        let store = PgSessionStore::new(postgres.clone(), config.auth.store_timeout());
        let authenticator = Authenticator::new(
            Arc::new(store),
            password_hasher.clone(),
            session_keys,
            Arc::new(SystemClock),
            &config.auth,
        );

        let service_state = Self {
            postgres,
            authenticator,
            password_hasher,
            profanity_filter: ProfanityFilter::default(),
            hit_counter: HitCounter::new(),
            webhook_key: config.load_webhook_key()?,
            platform: config.platform,
        };

        Ok(service_state)
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// External services:
impl_di!(postgres: PgClient);

// Internal services:
impl_di!(authenticator: Authenticator);
impl_di!(password_hasher: PasswordHasher);
impl_di!(profanity_filter: ProfanityFilter);
impl_di!(hit_counter: HitCounter);
impl_di!(webhook_key: WebhookKey);
impl_di!(platform: Platform);
