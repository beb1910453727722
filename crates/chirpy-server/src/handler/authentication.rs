//! Login, session refresh and refresh token revocation.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use jiff::SignedDuration;

use crate::extract::{BearerToken, Json};
use crate::handler::Result;
use crate::handler::request::Login;
use crate::handler::response::{ErrorResponse, LoginResponse, RefreshResponse};
use crate::service::{Authenticator, ServiceState};

/// Tracing target for authentication handlers.
const TRACING_TARGET: &str = "chirpy_server::handler::authentication";

/// Exchanges an email and password for a session and a refresh token.
#[tracing::instrument(skip_all)]
async fn login(
    State(authenticator): State<Authenticator>,
    Json(request): Json<Login>,
) -> Result<(StatusCode, Json<LoginResponse>)> {
    let requested_ttl = request.expires_in_seconds.map(SignedDuration::from_secs);
    let session = authenticator
        .login(&request.email, &request.password, requested_ttl)
        .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        user_id = %session.user.id,
        refresh_expires_at = %session.refresh_token.expires_at,
        "login succeeded"
    );

    let response = LoginResponse {
        user: session.user.into(),
        token: session.session_token,
        refresh_token: session.refresh_token.token,
    };

    Ok((StatusCode::OK, Json(response)))
}

fn login_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Log in")
        .description(
            "Verifies the credentials and returns the user together with a session token \
             and a refresh token. `expires_in_seconds` can shorten the session lifetime.",
        )
        .tag("authentication")
        .response::<200, Json<LoginResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Issues a new session token for a refresh token.
#[tracing::instrument(skip_all)]
async fn refresh(
    State(authenticator): State<Authenticator>,
    refresh_token: BearerToken,
) -> Result<(StatusCode, Json<RefreshResponse>)> {
    let session = authenticator.refresh(&refresh_token).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        user_id = %session.user_id,
        rotated = session.refresh_token.is_some(),
        "session refreshed"
    );

    let response = RefreshResponse {
        token: session.session_token,
        refresh_token: session.refresh_token.map(|issued| issued.token),
    };

    Ok((StatusCode::OK, Json(response)))
}

fn refresh_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Refresh session")
        .description(
            "Takes `Authorization: Bearer <refresh_token>` and returns a new session token. \
             When refresh tokens are rotated the response also carries the replacement \
             refresh token and the presented one is revoked.",
        )
        .tag("authentication")
        .response::<200, Json<RefreshResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Revokes a refresh token.
#[tracing::instrument(skip_all)]
async fn revoke(
    State(authenticator): State<Authenticator>,
    refresh_token: BearerToken,
) -> Result<StatusCode> {
    authenticator.revoke(&refresh_token).await?;
    tracing::debug!(target: TRACING_TARGET, "refresh token revoked");
    Ok(StatusCode::NO_CONTENT)
}

fn revoke_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Revoke refresh token")
        .description(
            "Takes `Authorization: Bearer <refresh_token>` and revokes it. Revoking an unknown \
             or already revoked token also succeeds.",
        )
        .tag("authentication")
        .response::<204, ()>()
        .response::<401, Json<ErrorResponse>>()
}

/// Returns an [`ApiRouter`] with the authentication routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/api/login", post_with(login, login_docs))
        .api_route("/api/refresh", post_with(refresh, refresh_docs))
        .api_route("/api/revoke", post_with(revoke, revoke_docs))
}
