//! Posting, listing and deleting chirps.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use chirpy_postgres::PgClient;
use chirpy_postgres::model::NewChirp;
use chirpy_postgres::query::{ChirpFilter, ChirpRepository};

use crate::extract::{AuthState, Json, Path, Query};
use crate::handler::request::{ChirpPathParams, CreateChirp, ListChirps};
use crate::handler::response::{Chirp, Chirps, ErrorResponse};
use crate::handler::{ErrorKind, Result};
use crate::service::{ProfanityFilter, ServiceState};

/// Tracing target for chirp operations.
const TRACING_TARGET: &str = "chirpy_server::handler::chirps";

/// Posts a chirp on behalf of the authenticated user.
#[tracing::instrument(skip_all, fields(user_id = %auth_state.user_id()))]
async fn create_chirp(
    State(pg_client): State<PgClient>,
    State(profanity_filter): State<ProfanityFilter>,
    auth_state: AuthState,
    Json(request): Json<CreateChirp>,
) -> Result<(StatusCode, Json<Chirp>)> {
    let body = profanity_filter.validate(&request.body)?;

    let mut conn = pg_client.get_connection().await?;
    let chirp = conn
        .create_chirp(NewChirp {
            body,
            user_id: auth_state.user_id(),
        })
        .await?;

    tracing::info!(target: TRACING_TARGET, chirp_id = %chirp.id, "chirp created");

    Ok((StatusCode::CREATED, Json(Chirp::from_model(chirp))))
}

fn create_chirp_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Post a chirp")
        .description(
            "Creates a chirp of at most 140 characters. Profane words are replaced with `****`.",
        )
        .tag("chirps")
        .response::<201, Json<Chirp>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Lists chirps, optionally restricted to one author.
#[tracing::instrument(skip_all, fields(author_id = ?query.author_id, sort = %query.sort))]
async fn list_chirps(
    State(pg_client): State<PgClient>,
    Query(query): Query<ListChirps>,
) -> Result<(StatusCode, Json<Chirps>)> {
    let mut filter = ChirpFilter::default().with_sort(query.sort);
    if let Some(author_id) = query.author_id {
        filter = filter.with_author(author_id);
    }

    let mut conn = pg_client.get_connection().await?;
    let chirps = conn.list_chirps(filter).await?;

    tracing::debug!(target: TRACING_TARGET, count = chirps.len(), "chirps listed");

    let chirps = chirps.into_iter().map(Chirp::from_model).collect();
    Ok((StatusCode::OK, Json(chirps)))
}

fn list_chirps_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List chirps")
        .description(
            "Returns all chirps ordered by creation time. `author_id` restricts the list to \
             one user and `sort=desc` returns the newest first.",
        )
        .tag("chirps")
        .response::<200, Json<Chirps>>()
        .response::<400, Json<ErrorResponse>>()
}

/// Returns a single chirp.
#[tracing::instrument(skip_all, fields(chirp_id = %path_params.chirp_id))]
async fn get_chirp(
    State(pg_client): State<PgClient>,
    Path(path_params): Path<ChirpPathParams>,
) -> Result<(StatusCode, Json<Chirp>)> {
    let mut conn = pg_client.get_connection().await?;
    let chirp = conn
        .find_chirp_by_id(path_params.chirp_id)
        .await?
        .ok_or_else(chirp_not_found)?;

    Ok((StatusCode::OK, Json(Chirp::from_model(chirp))))
}

fn get_chirp_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get a chirp")
        .tag("chirps")
        .response::<200, Json<Chirp>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Deletes a chirp owned by the authenticated user.
#[tracing::instrument(
    skip_all,
    fields(
        user_id = %auth_state.user_id(),
        chirp_id = %path_params.chirp_id,
    )
)]
async fn delete_chirp(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(path_params): Path<ChirpPathParams>,
) -> Result<StatusCode> {
    let mut conn = pg_client.get_connection().await?;
    let chirp = conn
        .find_chirp_by_id(path_params.chirp_id)
        .await?
        .ok_or_else(chirp_not_found)?;

    if !chirp.is_authored_by(auth_state.user_id()) {
        tracing::warn!(target: TRACING_TARGET, "attempt to delete another user's chirp");
        return Err(ErrorKind::Forbidden
            .with_message("Only the author can delete a chirp")
            .with_resource("chirp"));
    }

    if !conn.delete_chirp(chirp.id).await? {
        return Err(chirp_not_found());
    }

    tracing::info!(target: TRACING_TARGET, "chirp deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn delete_chirp_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete a chirp")
        .tag("chirps")
        .response::<204, ()>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

fn chirp_not_found() -> crate::handler::Error<'static> {
    ErrorKind::NotFound
        .with_message("Chirp not found")
        .with_resource("chirp")
}

/// Returns an [`ApiRouter`] with the chirp routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/api/chirps",
            post_with(create_chirp, create_chirp_docs).get_with(list_chirps, list_chirps_docs),
        )
        .api_route(
            "/api/chirps/{chirp_id}",
            get_with(get_chirp, get_chirp_docs).delete_with(delete_chirp, delete_chirp_docs),
        )
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use super::*;
    use crate::handler::test::TestApp;

    fn session_token(app: &TestApp) -> anyhow::Result<String> {
        let user_id = app.auth.register("saul@bettercall.com", "123456");
        let token = app
            .auth
            .authenticator
            .mint_session_token(user_id, SignedDuration::from_mins(5))?;
        Ok(token)
    }

    #[tokio::test]
    async fn posting_requires_session_token() -> anyhow::Result<()> {
        let app = TestApp::with_router(|_| routes())?;

        let response = app
            .server
            .post("/api/chirps")
            .json(&json!({ "body": "hello" }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn long_chirp_is_rejected() -> anyhow::Result<()> {
        let app = TestApp::with_router(|_| routes())?;
        let token = session_token(&app)?;

        let response = app
            .server
            .post("/api/chirps")
            .authorization_bearer(token)
            .json(&json!({ "body": "a".repeat(141) }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["name"], "bad_request");
        assert_eq!(body["resource"], "chirp");
        Ok(())
    }

    #[tokio::test]
    async fn deleting_requires_session_token() -> anyhow::Result<()> {
        let app = TestApp::with_router(|_| routes())?;

        let response = app
            .server
            .delete(&format!("/api/chirps/{}", Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_chirp_id_is_bad_request() -> anyhow::Result<()> {
        let app = TestApp::with_router(|_| routes())?;

        let response = app.server.get("/api/chirps/not-a-uuid").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_sort_is_bad_request() -> anyhow::Result<()> {
        let app = TestApp::with_router(|_| routes())?;

        let response = app.server.get("/api/chirps?sort=sideways").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }
}
