//! Middleware configuration for the HTTP server.

use anyhow::anyhow;
use chirpy_server::middleware::{OpenApiConfig, RecoveryConfig};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Longest accepted request timeout, in seconds.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// OpenAPI paths and recovery settings.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Paths of the OpenAPI document and the Scalar UI.
    #[clap(flatten)]
    pub openapi: OpenApiConfig,

    /// Request timeout applied by the recovery middleware.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let timeout = self.recovery.request_timeout;
        if timeout == 0 || timeout > MAX_REQUEST_TIMEOUT_SECS {
            return Err(anyhow!(
                "Request timeout {timeout} seconds is invalid. \
                Must be between 1 and {MAX_REQUEST_TIMEOUT_SECS} seconds."
            ));
        }

        for path in [&self.openapi.open_api_json, &self.openapi.scalar_ui] {
            if !path.starts_with('/') {
                return Err(anyhow!("OpenAPI path '{path}' must start with '/'"));
            }
        }

        Ok(())
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            openapi_path = %self.openapi.open_api_json,
            scalar_path = %self.openapi.scalar_ui,
            request_timeout_secs = self.recovery.request_timeout,
            "middleware configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(MiddlewareConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = MiddlewareConfig {
            recovery: RecoveryConfig::with_timeout_secs(0),
            ..MiddlewareConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_relative_openapi_path() {
        let mut config = MiddlewareConfig::default();
        config.openapi.scalar_ui = "scalar".to_owned();
        assert!(config.validate().is_err());
    }
}
