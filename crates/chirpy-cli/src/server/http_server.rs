//! Plain HTTP listener.

use std::future::pending;
use std::io;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::lifecycle::serve_with_shutdown;
use super::shutdown::shutdown_signal;
use super::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` with graceful shutdown.
///
/// After a shutdown signal, in-flight requests get the configured shutdown
/// timeout to finish before the server stops waiting for them.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let server_addr = server_config.server_addr();

    let listener = TcpListener::bind(server_addr).await.map_err(|source| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %source,
            "failed to bind to address"
        );

        ServerError::Bind {
            address: server_addr.to_string(),
            source,
        }
    })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "server is listening for connections"
    );

    let shutdown_timeout = server_config.shutdown_timeout();
    serve_with_shutdown(&server_config, || async move {
        let (signalled_tx, signalled_rx) = oneshot::channel();
        let shutdown = async move {
            shutdown_signal(shutdown_timeout).await;
            let _ = signalled_tx.send(());
        };

        let drain_deadline = async move {
            if signalled_rx.await.is_err() {
                pending::<()>().await;
            }
            tokio::time::sleep(shutdown_timeout).await;
        };

        let serve = async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
        };

        tokio::select! {
            result = serve => result,
            () = drain_deadline => {
                tracing::warn!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    timeout_secs = shutdown_timeout.as_secs(),
                    "shutdown timeout elapsed, dropping remaining connections"
                );
                Ok::<(), io::Error>(())
            }
        }
    })
    .await
}
