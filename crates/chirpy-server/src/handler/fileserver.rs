//! Static files under `/app`, counted by the admin metrics.

use std::path::Path;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use tower_http::services::ServeDir;

use crate::service::{HitCounter, ServiceState};
use crate::utility::tracing_targets::TRACING_TARGET_METRICS;

/// Counts every request that reaches the fileserver.
async fn count_hit(State(hit_counter): State<HitCounter>, request: Request, next: Next) -> Response {
    let hits = hit_counter.increment();
    tracing::trace!(
        target: TRACING_TARGET_METRICS,
        path = %request.uri().path(),
        hits,
        "fileserver hit"
    );

    next.run(request).await
}

/// Returns a [`Router`] serving the files below `root` at `/app`.
///
/// These routes are not part of the OpenAPI document.
pub fn routes(state: &ServiceState, root: impl AsRef<Path>) -> Router<ServiceState> {
    let serve_dir = ServeDir::new(root.as_ref()).append_index_html_on_directories(true);

    Router::new()
        .nest_service("/app", serve_dir)
        .layer(from_fn_with_state(state.hit_counter.clone(), count_hit))
}
