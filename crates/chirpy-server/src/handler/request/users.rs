//! User account request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload for registering a user.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct CreateUser {
    /// Email address of the new account.
    #[validate(email, length(max = 254))]
    pub email: String,
    /// Plaintext password, hashed before it is stored.
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

/// Request payload for replacing the caller's email and password.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct UpdateUser {
    /// New email address.
    #[validate(email, length(max = 254))]
    pub email: String,
    /// New plaintext password.
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}
