//! Conversion of authentication and content failures into handler errors.
//!
//! Every credential or token failure collapses into the same generic
//! `unauthorized` response; the precise reason only reaches the logs.

use crate::handler::{Error, ErrorKind};
use crate::service::auth::{AuthError, CredentialError};
use crate::service::{ChirpError, PasswordError};
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION;

impl From<CredentialError> for Error<'static> {
    fn from(error: CredentialError) -> Self {
        match error {
            CredentialError::MissingHeader => ErrorKind::MissingAuthToken
                .with_suggestion("Send an `Authorization` header with the request"),
            CredentialError::Malformed | CredentialError::EmptyToken => {
                ErrorKind::MalformedAuthToken.with_context(error.to_string())
            }
        }
    }
}

impl From<AuthError> for Error<'static> {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Credential(error) => error.into(),
            AuthError::Password(PasswordError::EmptyPassword) => ErrorKind::BadRequest
                .with_message("Password must not be empty")
                .with_resource("password"),
            error if error.is_unauthorized() => {
                tracing::debug!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    reason = %error,
                    "request unauthorized"
                );
                ErrorKind::Unauthorized.with_context(error.to_string())
            }
            error => {
                tracing::error!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    error = %error,
                    "authentication failed on the server side"
                );
                ErrorKind::InternalServerError.with_context(error.to_string())
            }
        }
    }
}

impl From<PasswordError> for Error<'static> {
    #[inline]
    fn from(error: PasswordError) -> Self {
        AuthError::from(error).into()
    }
}

impl From<ChirpError> for Error<'static> {
    fn from(error: ChirpError) -> Self {
        match error {
            ChirpError::TooLong { length, max } => ErrorKind::BadRequest
                .with_message("Chirp is too long")
                .with_resource("chirp")
                .with_context(format!("length={length} max={max}")),
        }
    }
}
