//! Authentication response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::User;

/// Response returned after a successful login.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: User,
    /// Session token to send as `Authorization: Bearer <token>`.
    pub token: String,
    /// Long-lived token for `POST /api/refresh`.
    pub refresh_token: String,
}

/// Response returned after a session refresh.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct RefreshResponse {
    /// The new session token.
    pub token: String,
    /// The replacement refresh token, present when tokens are rotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}
