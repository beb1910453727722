#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use chirpy_server::handler::routes;
use chirpy_server::middleware::{RouterObservabilityExt, RouterRecoveryExt};
use chirpy_server::service::{ServiceConfig, ServiceState};

use crate::config::{Cli, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "chirpy_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "chirpy_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "chirpy_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();
    cli.validate()?;

    let state = create_service_state(&cli.service).await?;
    let fileserver_root = cli
        .service
        .fileserver_root()
        .context("invalid fileserver root")?;
    let router = create_router(state, fileserver_root, &cli.middleware);

    server::serve(router, cli.server).await?;

    Ok(())
}

/// Connects to Postgres, applies migrations and derives key material.
async fn create_service_state(config: &ServiceConfig) -> anyhow::Result<ServiceState> {
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        platform = %config.platform,
        "initializing service state"
    );

    ServiceState::from_config(config)
        .await
        .context("failed to create service state")
}

/// Creates the router with all middleware layers applied.
///
/// The last layer added is the outermost: recovery wraps observability, which
/// wraps request metrics and the routes.
fn create_router(
    state: ServiceState,
    fileserver_root: &std::path::Path,
    middleware: &MiddlewareConfig,
) -> Router {
    routes(state, fileserver_root, &middleware.openapi)
        .with_metrics()
        .with_observability()
        .with_recovery(&middleware.recovery)
}
