//! Database constraint violations organized by table.

use std::fmt;

/// Constraint violations for the `users` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserConstraints {
    /// Email addresses are unique.
    EmailUnique,
    /// Email addresses are not blank.
    EmailNotEmpty,
}

impl UserConstraints {
    /// Returns the PostgreSQL constraint name.
    #[must_use]
    pub const fn constraint_name(self) -> &'static str {
        match self {
            Self::EmailUnique => "users_email_key",
            Self::EmailNotEmpty => "users_email_not_empty",
        }
    }

    /// Returns a user-facing message for this violation.
    #[must_use]
    pub const fn error_message(self) -> &'static str {
        match self {
            Self::EmailUnique => "A user with this email already exists",
            Self::EmailNotEmpty => "Email must not be empty",
        }
    }

    fn from_constraint_name(name: &str) -> Option<Self> {
        match name {
            "users_email_key" => Some(Self::EmailUnique),
            "users_email_not_empty" => Some(Self::EmailNotEmpty),
            _ => None,
        }
    }
}

/// Constraint violations for the `chirps` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChirpConstraints {
    /// The author must exist.
    UserForeignKey,
}

impl ChirpConstraints {
    /// Returns the PostgreSQL constraint name.
    #[must_use]
    pub const fn constraint_name(self) -> &'static str {
        match self {
            Self::UserForeignKey => "chirps_user_id_fkey",
        }
    }

    /// Returns a user-facing message for this violation.
    #[must_use]
    pub const fn error_message(self) -> &'static str {
        match self {
            Self::UserForeignKey => "The author of this chirp no longer exists",
        }
    }

    fn from_constraint_name(name: &str) -> Option<Self> {
        match name {
            "chirps_user_id_fkey" => Some(Self::UserForeignKey),
            _ => None,
        }
    }
}

/// Constraint violations for the `refresh_tokens` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshTokenConstraints {
    /// Token digests are the primary key.
    TokenHashUnique,
    /// The owning user must exist.
    UserForeignKey,
    /// Expiration must come after creation.
    ExpiresAfterCreated,
}

impl RefreshTokenConstraints {
    /// Returns the PostgreSQL constraint name.
    #[must_use]
    pub const fn constraint_name(self) -> &'static str {
        match self {
            Self::TokenHashUnique => "refresh_tokens_pkey",
            Self::UserForeignKey => "refresh_tokens_user_id_fkey",
            Self::ExpiresAfterCreated => "refresh_tokens_expires_after_created",
        }
    }

    /// Returns a user-facing message for this violation.
    #[must_use]
    pub const fn error_message(self) -> &'static str {
        match self {
            Self::TokenHashUnique => "Refresh token already exists",
            Self::UserForeignKey => "The owner of this refresh token no longer exists",
            Self::ExpiresAfterCreated => "Refresh token must expire after it is created",
        }
    }

    fn from_constraint_name(name: &str) -> Option<Self> {
        match name {
            "refresh_tokens_pkey" => Some(Self::TokenHashUnique),
            "refresh_tokens_user_id_fkey" => Some(Self::UserForeignKey),
            "refresh_tokens_expires_after_created" => Some(Self::ExpiresAfterCreated),
            _ => None,
        }
    }
}

/// Any known constraint violation, grouped by table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintViolation {
    User(UserConstraints),
    Chirp(ChirpConstraints),
    RefreshToken(RefreshTokenConstraints),
}

impl ConstraintViolation {
    /// Maps a PostgreSQL constraint name to a known violation.
    pub fn new(constraint: &str) -> Option<Self> {
        UserConstraints::from_constraint_name(constraint)
            .map(Self::User)
            .or_else(|| ChirpConstraints::from_constraint_name(constraint).map(Self::Chirp))
            .or_else(|| {
                RefreshTokenConstraints::from_constraint_name(constraint).map(Self::RefreshToken)
            })
    }

    /// Returns the PostgreSQL constraint name.
    pub const fn constraint_name(self) -> &'static str {
        match self {
            Self::User(c) => c.constraint_name(),
            Self::Chirp(c) => c.constraint_name(),
            Self::RefreshToken(c) => c.constraint_name(),
        }
    }

    /// Returns a user-facing message for this violation.
    pub const fn error_message(self) -> &'static str {
        match self {
            Self::User(c) => c.error_message(),
            Self::Chirp(c) => c.error_message(),
            Self::RefreshToken(c) => c.error_message(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.constraint_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_constraints() {
        assert_eq!(
            ConstraintViolation::new("users_email_key"),
            Some(ConstraintViolation::User(UserConstraints::EmailUnique))
        );
        assert_eq!(
            ConstraintViolation::new("refresh_tokens_user_id_fkey"),
            Some(ConstraintViolation::RefreshToken(
                RefreshTokenConstraints::UserForeignKey
            ))
        );
        assert_eq!(ConstraintViolation::new("something_else"), None);
    }

    #[test]
    fn names_round_trip() {
        let all = [
            ConstraintViolation::User(UserConstraints::EmailUnique),
            ConstraintViolation::User(UserConstraints::EmailNotEmpty),
            ConstraintViolation::Chirp(ChirpConstraints::UserForeignKey),
            ConstraintViolation::RefreshToken(RefreshTokenConstraints::TokenHashUnique),
            ConstraintViolation::RefreshToken(RefreshTokenConstraints::ExpiresAfterCreated),
        ];

        for violation in all {
            assert_eq!(
                ConstraintViolation::new(violation.constraint_name()),
                Some(violation)
            );
            assert!(!violation.error_message().is_empty());
        }
    }
}
