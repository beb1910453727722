//! Chirp model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::chirps;

/// A short post written by a user.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = chirps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Cleaned body text.
    pub body: String,
    /// Author of the chirp.
    pub user_id: Uuid,
}

/// Data for creating a new chirp.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chirps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewChirp {
    pub body: String,
    pub user_id: Uuid,
}

impl Chirp {
    /// Returns whether the given user wrote this chirp.
    #[inline]
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Returns the creation time as a [`jiff::Timestamp`].
    #[inline]
    pub fn created_at(&self) -> jiff::Timestamp {
        jiff::Timestamp::from(self.created_at)
    }

    /// Returns the last update time as a [`jiff::Timestamp`].
    #[inline]
    pub fn updated_at(&self) -> jiff::Timestamp {
        jiff::Timestamp::from(self.updated_at)
    }
}
