//! Admin metrics and development reset.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use chirpy_postgres::PgClient;
use chirpy_postgres::query::UserRepository;

use crate::extract::Json;
use crate::handler::{ErrorKind, ErrorResponse, Result};
use crate::service::{HitCounter, Platform, ServiceState};

/// Tracing target for admin operations.
const TRACING_TARGET: &str = "chirpy_server::handler::admin";

/// Renders the fileserver hit count.
#[tracing::instrument(skip_all)]
async fn metrics(State(hit_counter): State<HitCounter>) -> Html<String> {
    let hits = hit_counter.hits();
    Html(format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    \
         <p>Chirpy has been visited {hits} times!</p>\n  </body>\n</html>\n"
    ))
}

fn metrics_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Fileserver metrics")
        .description("Returns an HTML page with the number of fileserver hits.")
        .tag("admin")
}

/// Deletes every user and resets the hit counter. Only allowed on `dev`.
#[tracing::instrument(skip_all, fields(platform = %platform))]
async fn reset(
    State(platform): State<Platform>,
    State(pg_client): State<PgClient>,
    State(hit_counter): State<HitCounter>,
) -> Result<(StatusCode, &'static str)> {
    if !platform.is_dev() {
        tracing::warn!(target: TRACING_TARGET, "reset refused outside of dev");
        return Err(ErrorKind::Forbidden
            .with_message("Reset is only allowed in the dev environment")
            .with_resource("admin"));
    }

    let mut conn = pg_client.get_connection().await?;
    let deleted = conn.delete_all_users().await?;
    hit_counter.reset();

    tracing::warn!(
        target: TRACING_TARGET,
        deleted_users = deleted,
        "service state reset"
    );

    Ok((StatusCode::OK, "State Reset"))
}

fn reset_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Reset state")
        .description(
            "Deletes all users with their chirps and refresh tokens, and resets the hit \
             counter. Forbidden unless the platform is `dev`.",
        )
        .tag("admin")
        .response::<403, Json<ErrorResponse>>()
}

/// Returns an [`ApiRouter`] with the admin routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/admin/metrics", get_with(metrics, metrics_docs))
        .api_route("/admin/reset", post_with(reset, reset_docs))
}
