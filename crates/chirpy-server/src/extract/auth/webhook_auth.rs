//! Payment provider webhook authentication.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::extract::auth::ApiKey;
use crate::handler::{Error, ErrorKind};
use crate::service::WebhookKey;
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION;

/// Proof that the request carried the configured webhook API key.
///
/// Runs on the request head, so a caller with a wrong key is rejected before
/// the body is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookAuth;

impl<S> FromRequestParts<S> for WebhookAuth
where
    S: Send + Sync,
    WebhookKey: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let api_key = ApiKey::from_request_parts(parts, state).await?;

        if !WebhookKey::from_ref(state).verify(&api_key) {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                "webhook rejected: invalid api key"
            );
            return Err(ErrorKind::Unauthorized.with_resource("webhook"));
        }

        Ok(Self)
    }
}

impl aide::OperationInput for WebhookAuth {}
