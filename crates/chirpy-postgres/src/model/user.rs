//! User account model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::users;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Timestamp when the user was created.
    pub created_at: Timestamp,
    /// Timestamp when the user was last updated.
    pub updated_at: Timestamp,
    /// Normalized (trimmed, lowercase) email address.
    pub email: String,
    /// Argon2 PHC string of the user's password.
    pub hashed_password: String,
    /// Whether the user has a Chirpy Red membership.
    pub is_chirpy_red: bool,
}

/// Data for creating a new user.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser {
    /// Email address, normalized on insert.
    pub email: String,
    /// Argon2 PHC string of the user's password.
    pub hashed_password: String,
}

/// Partial update of a user. Only `Some` fields are written.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateUser {
    pub email: Option<String>,
    pub hashed_password: Option<String>,
    pub is_chirpy_red: Option<bool>,
    pub updated_at: Option<Timestamp>,
}

impl User {
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
