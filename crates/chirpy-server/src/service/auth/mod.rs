//! Authentication core.
//!
//! [`Authenticator`] composes the password hasher, the session token codec
//! and the refresh token manager into the login, refresh, revoke and
//! authorize flows consumed by the HTTP handlers. Persistence goes through
//! the [`SessionStore`] seam and time through the [`Clock`] seam.

mod authenticator;
mod clock;
mod config;
mod credential;
mod error;
pub mod refresh_token;
pub mod session_token;
mod store;

#[cfg(test)]
pub(crate) use authenticator::testing;
pub use authenticator::{Authenticator, LoginSession, RefreshedSession};
#[cfg(test)]
pub(crate) use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use config::{AuthConfig, RefreshRotation};
pub use credential::{
    API_KEY_PREFIX, BEARER_PREFIX, CredentialError, extract_api_key, extract_bearer,
};
pub use error::{AuthError, AuthResult};
pub use refresh_token::{IssuedRefreshToken, RefreshTokenManager, RefreshTokenState};
pub use session_token::{SessionClaims, SessionTokenError};
#[cfg(test)]
pub(crate) use store::MemorySessionStore;
pub use store::{PgSessionStore, SessionStore, StoredCredential, UserProfile};
