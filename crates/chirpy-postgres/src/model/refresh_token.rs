//! Refresh token model.
//!
//! Rows are never deleted by the service. A token leaves the active state
//! either by having `revoked_at` set or by passing `expires_at`.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::refresh_tokens;

/// A persisted refresh token, keyed by the SHA-256 digest of its value.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = refresh_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RefreshToken {
    /// Hex-encoded SHA-256 digest of the opaque token.
    pub token_hash: String,
    /// User the token was issued to.
    pub user_id: Uuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Instant after which the token can no longer be renewed.
    pub expires_at: Timestamp,
    /// Instant the token was revoked, if it was.
    pub revoked_at: Option<Timestamp>,
}

/// Data for persisting a newly issued refresh token.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = refresh_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewRefreshToken {
    pub token_hash: String,
    pub user_id: Uuid,
    /// Issuing instant. Must precede `expires_at`.
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl RefreshToken {
    /// Returns whether the token has been revoked.
    #[inline]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns whether the token is past its expiry at `now`.
    #[inline]
    pub fn is_expired_at(&self, now: jiff::Timestamp) -> bool {
        now > jiff::Timestamp::from(self.expires_at)
    }

    /// Returns the expiry as a [`jiff::Timestamp`].
    #[inline]
    pub fn expires_at(&self) -> jiff::Timestamp {
        jiff::Timestamp::from(self.expires_at)
    }
}
