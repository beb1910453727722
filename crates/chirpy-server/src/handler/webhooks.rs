//! Payment provider webhook.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use chirpy_postgres::PgClient;
use chirpy_postgres::query::UserRepository;

use crate::extract::{Json, WebhookAuth};
use crate::handler::request::{PolkaEvent, PolkaWebhook};
use crate::handler::response::ErrorResponse;
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for webhook operations.
const TRACING_TARGET: &str = "chirpy_server::handler::webhooks";

/// Applies a membership event from the payment provider.
///
/// Events other than `user.upgraded` are acknowledged and ignored, and so
/// are upgrades of users who already are members.
#[tracing::instrument(skip_all, fields(event = ?request.event, user_id = %request.data.user_id))]
async fn polka_webhook(
    State(pg_client): State<PgClient>,
    _: WebhookAuth,
    Json(request): Json<PolkaWebhook>,
) -> Result<StatusCode> {
    if request.event != PolkaEvent::UserUpgraded {
        tracing::debug!(target: TRACING_TARGET, "webhook event ignored");
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_not_found = || {
        ErrorKind::NotFound
            .with_message("User not found")
            .with_resource("user")
    };

    let mut conn = pg_client.get_connection().await?;
    let user = conn
        .find_user_by_id(request.data.user_id)
        .await?
        .ok_or_else(user_not_found)?;

    if user.is_chirpy_red {
        tracing::debug!(target: TRACING_TARGET, "user already has chirpy red");
        return Ok(StatusCode::NO_CONTENT);
    }

    if conn
        .upgrade_user_to_chirpy_red(user.id)
        .await?
        .is_none()
    {
        return Err(user_not_found());
    }

    tracing::info!(target: TRACING_TARGET, "user upgraded to chirpy red");
    Ok(StatusCode::NO_CONTENT)
}

fn polka_webhook_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Payment provider webhook")
        .description(
            "Authenticated with `Authorization: ApiKey <key>`. A `user.upgraded` event grants \
             the user a Chirpy Red membership; other events are ignored.",
        )
        .tag("webhooks")
        .response::<204, ()>()
        .response::<401, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns an [`ApiRouter`] with the webhook routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new().api_route(
        "/api/polka/webhooks",
        post_with(polka_webhook, polka_webhook_docs),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use uuid::Uuid;

    use super::*;
    use crate::handler::test::{TEST_POLKA_KEY, TestApp};

    fn payload(event: &str) -> Value {
        json!({ "event": event, "data": { "user_id": Uuid::new_v4() } })
    }

    #[tokio::test]
    async fn wrong_api_key_is_unauthorized() -> anyhow::Result<()> {
        let app = TestApp::with_router(|_| routes())?;

        let response = app
            .server
            .post("/api/polka/webhooks")
            .add_header("Authorization", "ApiKey not-the-key")
            .json(&payload("user.upgraded"))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["name"], "unauthorized");
        Ok(())
    }

    #[tokio::test]
    async fn wrong_api_key_is_checked_before_body() -> anyhow::Result<()> {
        let app = TestApp::with_router(|_| routes())?;

        let response = app
            .server
            .post("/api/polka/webhooks")
            .add_header("Authorization", "ApiKey not-the-key")
            .text("{ not json")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["name"], "unauthorized");
        Ok(())
    }

    #[tokio::test]
    async fn valid_api_key_with_malformed_body_is_bad_request() -> anyhow::Result<()> {
        let app = TestApp::with_router(|_| routes())?;

        let response = app
            .server
            .post("/api/polka/webhooks")
            .add_header("Authorization", format!("ApiKey {TEST_POLKA_KEY}"))
            .text("{ not json")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn bearer_scheme_is_malformed() -> anyhow::Result<()> {
        let app = TestApp::with_router(|_| routes())?;

        let response = app
            .server
            .post("/api/polka/webhooks")
            .authorization_bearer(TEST_POLKA_KEY)
            .json(&payload("user.upgraded"))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["name"], "malformed_auth_token");
        Ok(())
    }

    #[tokio::test]
    async fn other_events_are_acknowledged() -> anyhow::Result<()> {
        let app = TestApp::with_router(|_| routes())?;

        let response = app
            .server
            .post("/api/polka/webhooks")
            .add_header("Authorization", format!("ApiKey {TEST_POLKA_KEY}"))
            .json(&payload("user.payment_failed"))
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        Ok(())
    }
}
