//! Chirp request types.

use chirpy_postgres::types::SortOrder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request payload for posting a chirp.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct CreateChirp {
    /// Text of the chirp, at most 140 characters.
    pub body: String,
}

/// Path parameters of single-chirp routes.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ChirpPathParams {
    /// The unique identifier of the chirp.
    pub chirp_id: Uuid,
}

/// Query parameters for listing chirps.
#[must_use]
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ListChirps {
    /// Only return chirps written by this user.
    #[serde(default)]
    pub author_id: Option<Uuid>,
    /// Ordering on creation time, `asc` by default.
    #[serde(default)]
    pub sort: SortOrder,
}
