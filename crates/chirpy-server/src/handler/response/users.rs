//! User account response types.

use chirpy_postgres::model;
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::auth::UserProfile;

/// Public view of a user. The password hash is never exposed.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: Uuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub email: String,
    /// Whether the user has a Chirpy Red membership.
    pub is_chirpy_red: bool,
}

impl User {
    pub fn from_model(user: model::User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at(),
            updated_at: user.updated_at(),
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

impl From<UserProfile> for User {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
            email: profile.email,
            is_chirpy_red: profile.is_chirpy_red,
        }
    }
}
