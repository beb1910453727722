//! Request ids, header redaction, tracing spans and request timing.

use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, header};
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use crate::utility::tracing_targets::TRACING_TARGET_METRICS;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
pub trait RouterObservabilityExt<S> {
    /// Layers request ids, credential redaction and request tracing.
    ///
    /// Every request gets an `x-request-id` which is echoed on the response.
    /// `Authorization` and `Cookie` headers are marked sensitive so the trace
    /// layer never records them.
    fn with_observability(self) -> Self;

    /// Layers request timing and size logging.
    fn with_metrics(self) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        self.layer(PropagateRequestIdLayer::new(REQUEST_ID))
            .layer(SetSensitiveRequestHeadersLayer::new([
                header::AUTHORIZATION,
                header::COOKIE,
            ]))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
    }

    fn with_metrics(self) -> Self {
        self.layer(from_fn(track_request_metrics))
    }
}

fn content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// Logs the method, path, status, duration and body sizes of each request.
pub async fn track_request_metrics(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let request_size = content_length(request.headers());

    tracing::trace!(
        target: TRACING_TARGET_METRICS,
        method = %method,
        path = %path,
        request_size,
        "request started"
    );

    let response = next.run(request).await;

    tracing::debug!(
        target: TRACING_TARGET_METRICS,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = started_at.elapsed().as_millis() as u64,
        request_size,
        response_size = content_length(response.headers()),
        "request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;

    fn router() -> Router {
        Router::new()
            .route("/api/healthz", get(|| async { "OK" }))
            .with_metrics()
            .with_observability()
    }

    #[tokio::test]
    async fn generates_request_id() -> anyhow::Result<()> {
        let server = TestServer::new(router())?;

        let response = server.get("/api/healthz").await;
        response.assert_status_ok();
        let request_id = response.header(REQUEST_ID);
        assert!(!request_id.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn propagates_client_request_id() -> anyhow::Result<()> {
        let server = TestServer::new(router())?;

        let response = server
            .get("/api/healthz")
            .add_header(REQUEST_ID, "chirp-42")
            .await;
        assert_eq!(response.header(REQUEST_ID), "chirp-42");
        Ok(())
    }
}
