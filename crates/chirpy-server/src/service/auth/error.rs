//! Error taxonomy of the authentication core.
//!
//! Variants keep the internal distinctions (expired vs. revoked vs.
//! malformed) for logging. The HTTP boundary collapses them into a generic
//! unauthorized response.

use chirpy_postgres::PgError;

use crate::service::auth::credential::CredentialError;
use crate::service::auth::session_token::SessionTokenError;
use crate::service::security::PasswordError;

/// Result type of authentication operations.
pub type AuthResult<T, E = AuthError> = std::result::Result<T, E>;

/// Errors produced by the authentication core.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Password hashing or verification failed.
    #[error(transparent)]
    Password(#[from] PasswordError),
    /// The `Authorization` header could not be parsed.
    #[error(transparent)]
    Credential(#[from] CredentialError),
    /// The session token failed validation or could not be signed.
    #[error(transparent)]
    SessionToken(#[from] SessionTokenError),
    /// Unknown email or wrong password.
    #[error("incorrect email or password")]
    InvalidCredentials,
    /// No refresh token with the presented value exists.
    #[error("refresh token not found")]
    RefreshTokenNotFound,
    /// The refresh token is past its expiry.
    #[error("refresh token has expired")]
    RefreshTokenExpired,
    /// The refresh token was revoked.
    #[error("refresh token has been revoked")]
    RefreshTokenRevoked,
    /// The session store failed.
    #[error("session store error: {0}")]
    Store(#[from] PgError),
    /// A session store call exceeded its deadline.
    #[error("session store call `{0}` timed out")]
    StoreTimeout(&'static str),
    /// Expiry arithmetic overflowed.
    #[error("timestamp arithmetic failed: {0}")]
    Time(#[from] jiff::Error),
}

impl AuthError {
    /// Returns `true` if the failure is caused by the caller's credentials
    /// rather than by the server.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Credential(_)
            | Self::InvalidCredentials
            | Self::RefreshTokenNotFound
            | Self::RefreshTokenExpired
            | Self::RefreshTokenRevoked => true,
            Self::SessionToken(error) => !matches!(error, SessionTokenError::Signing(_)),
            Self::Password(error) => matches!(
                error,
                PasswordError::Mismatch | PasswordError::MalformedHash
            ),
            Self::Store(_) | Self::StoreTimeout(_) | Self::Time(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_are_unauthorized() {
        assert!(AuthError::InvalidCredentials.is_unauthorized());
        assert!(AuthError::RefreshTokenRevoked.is_unauthorized());
        assert!(AuthError::from(SessionTokenError::Expired).is_unauthorized());
        assert!(AuthError::from(CredentialError::MissingHeader).is_unauthorized());
    }

    #[test]
    fn server_failures_are_not_unauthorized() {
        assert!(!AuthError::StoreTimeout("find_refresh_token").is_unauthorized());
        assert!(!AuthError::from(PasswordError::EmptyPassword).is_unauthorized());
        assert!(!AuthError::from(PgError::Unexpected("boom".into())).is_unauthorized());
    }
}
