//! Conversion of database failures into handler errors.
//!
//! Known constraint violations become client errors with a readable message.
//! Everything else is logged and reported as an opaque server error.

use chirpy_postgres::PgError;
use chirpy_postgres::types::{
    ChirpConstraints, ConstraintViolation, RefreshTokenConstraints, UserConstraints,
};

use crate::handler::{Error, ErrorKind};
use crate::utility::tracing_targets::TRACING_TARGET_POSTGRES;

impl From<ConstraintViolation> for Error<'static> {
    fn from(violation: ConstraintViolation) -> Self {
        let message = violation.error_message();
        match violation {
            ConstraintViolation::User(UserConstraints::EmailUnique) => ErrorKind::Conflict
                .with_message(message)
                .with_resource("user")
                .with_suggestion("Log in with the existing account or use another email"),
            ConstraintViolation::User(UserConstraints::EmailNotEmpty) => ErrorKind::BadRequest
                .with_message(message)
                .with_resource("user"),
            ConstraintViolation::Chirp(ChirpConstraints::UserForeignKey) => ErrorKind::NotFound
                .with_message(message)
                .with_resource("user"),
            ConstraintViolation::RefreshToken(
                RefreshTokenConstraints::TokenHashUnique
                | RefreshTokenConstraints::UserForeignKey
                | RefreshTokenConstraints::ExpiresAfterCreated,
            ) => ErrorKind::InternalServerError
                .into_error()
                .with_context(violation.constraint_name()),
        }
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        if let Some(violation) = error.constraint_violation() {
            tracing::warn!(
                target: TRACING_TARGET_POSTGRES,
                constraint = %violation,
                error = %error,
                "constraint violation"
            );
            return violation.into();
        }

        match &error {
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: TRACING_TARGET_POSTGRES,
                    timeout = ?timeout,
                    "database pool timed out"
                );
            }
            PgError::Connection(_) | PgError::Config(_) | PgError::Migration(_) => {
                tracing::error!(
                    target: TRACING_TARGET_POSTGRES,
                    error = %error,
                    transient = error.is_transient(),
                    "database unavailable"
                );
            }
            PgError::Query(_) | PgError::Unexpected(_) => {
                tracing::error!(
                    target: TRACING_TARGET_POSTGRES,
                    error = %error,
                    "database query failed"
                );
            }
        }

        ErrorKind::InternalServerError
            .into_error()
            .with_context(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use chirpy_postgres::TimeoutType;

    use super::*;

    #[test]
    fn duplicate_email_is_conflict() {
        let error = Error::from(ConstraintViolation::User(UserConstraints::EmailUnique));
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.resource(), Some("user"));
    }

    #[test]
    fn refresh_token_constraints_are_internal() {
        let error = Error::from(ConstraintViolation::RefreshToken(
            RefreshTokenConstraints::TokenHashUnique,
        ));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert!(error.message().is_none());
    }

    #[test]
    fn pool_timeout_is_internal() {
        let error = Error::from(PgError::Timeout(TimeoutType::Wait));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert!(error.context().is_some());
    }
}
