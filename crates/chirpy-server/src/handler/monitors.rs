//! Liveness probe.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;

/// Reports that the process is up. Does not touch the database.
async fn readiness() -> &'static str {
    "OK"
}

fn readiness_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Health check")
        .description("Returns `OK` as plain text while the server is running.")
        .tag("monitors")
}

/// Returns an [`ApiRouter`] with the health check route.
pub fn routes<S>() -> ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    use aide::axum::routing::*;

    ApiRouter::new().api_route("/api/healthz", get_with(readiness, readiness_docs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test::TestApp;

    #[tokio::test]
    async fn healthz_returns_ok() -> anyhow::Result<()> {
        let app = TestApp::with_router(|_| routes())?;

        let response = app.server.get("/api/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
        assert!(
            response
                .header("content-type")
                .to_str()?
                .starts_with("text/plain")
        );
        Ok(())
    }
}
