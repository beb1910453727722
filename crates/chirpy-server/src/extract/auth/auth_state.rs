//! Session token authentication.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;
use uuid::Uuid;

use crate::handler::Error;
use crate::service::Authenticator;
use crate::service::auth::extract_bearer;

/// The user whose bearer session token was validated for this request.
///
/// Resolving it performs no I/O; the result is cached in the request
/// extensions so repeated extraction is free. Ownership checks against the
/// requested resource are left to the handler.
#[derive(Debug, Clone, Copy, Deref, PartialEq, Eq)]
pub struct AuthState(pub Uuid);

impl AuthState {
    /// Returns the acting user's id.
    #[inline]
    pub fn user_id(&self) -> Uuid {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Send + Sync,
    Authenticator: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(*auth_state);
        }

        let token = extract_bearer(&parts.headers)?;
        let user_id = Authenticator::from_ref(state).authorize(token)?;

        let auth_state = Self(user_id);
        parts.extensions.insert(auth_state);
        Ok(auth_state)
    }
}

impl aide::OperationInput for AuthState {}
