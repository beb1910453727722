//! Payment provider webhook request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events the payment provider sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum PolkaEvent {
    /// The user paid for a Chirpy Red membership.
    #[serde(rename = "user.upgraded")]
    UserUpgraded,
    /// Any event this service does not act on.
    #[serde(other)]
    Other,
}

/// Request payload of the payment provider webhook.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct PolkaWebhook {
    pub event: PolkaEvent,
    pub data: PolkaWebhookData,
}

/// Event payload of the payment provider webhook.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct PolkaWebhookData {
    /// The user the event is about.
    pub user_id: Uuid,
}
