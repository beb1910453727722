//! Chirp response types.

use chirpy_postgres::model;
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A posted chirp.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Text of the chirp after profanity filtering.
    pub body: String,
    /// The author.
    pub user_id: Uuid,
}

/// A list of chirps.
pub type Chirps = Vec<Chirp>;

impl Chirp {
    pub fn from_model(chirp: model::Chirp) -> Self {
        Self {
            id: chirp.id,
            created_at: chirp.created_at(),
            updated_at: chirp.updated_at(),
            body: chirp.body,
            user_id: chirp.user_id,
        }
    }
}
