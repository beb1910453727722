//! Authentication request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Request payload for login.
///
/// The fields are not validated up front so that every failure, including
/// a malformed email, is reported as the same generic `unauthorized`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct Login {
    /// Email address of the account.
    pub email: String,
    /// Password of the account.
    pub password: String,
    /// Requested session token lifetime in seconds.
    ///
    /// Capped at the configured session lifetime; ignored unless positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in_seconds: Option<i64>,
}
