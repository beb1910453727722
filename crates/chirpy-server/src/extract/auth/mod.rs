//! Authentication extractors.

mod auth_state;
mod credential;
mod webhook_auth;

pub use auth_state::AuthState;
pub use credential::{ApiKey, BearerToken};
pub use webhook_auth::WebhookAuth;
