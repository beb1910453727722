//! OpenAPI document and Scalar UI served from the documented routes.
//!
//! The document is generated by [`aide`] from the [`ApiRouter`] once, when
//! the router is finished, and shared with the JSON endpoint as an
//! [`Extension`].
//!
//! [`aide`]: https://docs.rs/aide

use aide::axum::ApiRouter;
use aide::openapi::{Info, License, OpenApi};
use aide::scalar::Scalar;
use axum::routing::{Router, get};
use axum::{Extension, Json};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Paths of the OpenAPI JSON document and the Scalar UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OpenApiConfig {
    /// Path which exposes the OpenAPI JSON document.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_JSON_PATH", default_value = "/api/openapi.json")
    )]
    pub open_api_json: String,

    /// Path which exposes the Scalar API reference UI.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_SCALAR_PATH", default_value = "/api/scalar")
    )]
    pub scalar_ui: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            open_api_json: "/api/openapi.json".to_owned(),
            scalar_ui: "/api/scalar".to_owned(),
        }
    }
}

/// Extension trait for [`ApiRouter`] to serve its OpenAPI document.
pub trait RouterOpenApiExt<S> {
    /// Serves the document with the default Chirpy [`Info`].
    fn with_open_api(self, config: &OpenApiConfig) -> Router<S>;

    /// Serves the document with a caller-provided [`Info`].
    fn with_open_api_info(self, config: &OpenApiConfig, info: Info) -> Router<S>;
}

impl<S> RouterOpenApiExt<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_open_api(self, config: &OpenApiConfig) -> Router<S> {
        let info = Info {
            title: "Chirpy API".to_owned(),
            summary: Some("Short posts with session and refresh token auth".to_owned()),
            description: Some(
                "Register users, log in for a short-lived session token and a long-lived \
                refresh token, then post, list and delete chirps."
                    .to_owned(),
            ),
            license: Some(License {
                name: "MIT".to_owned(),
                identifier: Some("MIT".to_owned()),
                ..License::default()
            }),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            ..Info::default()
        };

        self.with_open_api_info(config, info)
    }

    fn with_open_api_info(self, config: &OpenApiConfig, info: Info) -> Router<S> {
        async fn serve_openapi(Extension(api): Extension<OpenApi>) -> Json<OpenApi> {
            Json(api)
        }

        let mut api = OpenApi {
            info,
            ..OpenApi::default()
        };

        let scalar = Scalar::new(&config.open_api_json);
        let router = self
            .route(&config.scalar_ui, scalar.axum_route())
            .route(&config.open_api_json, get(serve_openapi));

        router.finish_api(&mut api).layer(Extension(api))
    }
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;

    use super::*;

    #[tokio::test]
    async fn serves_document_and_ui() -> anyhow::Result<()> {
        let config = OpenApiConfig::default();
        let router: Router = ApiRouter::new().with_open_api(&config);
        let server = TestServer::new(router)?;

        let response = server.get(&config.open_api_json).await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<serde_json::Value>()["info"]["title"],
            "Chirpy API"
        );

        server.get(&config.scalar_ui).await.assert_status_ok();
        Ok(())
    }
}
