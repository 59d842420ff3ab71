//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the multi-threaded worker runtime with the configured size
//! - Bind the listener, start the signal listener, then serve
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::sync::Arc;

use thiserror::Error;
use tokio::runtime::{Builder, Runtime};

use crate::config::{ConfigError, GatewayConfig, RuntimeConfig};
use crate::http::HttpServer;
use crate::lifecycle::drain::DrainPolicy;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::net::listener::{self, ListenerError};
use crate::observability::logging::LoggingError;
use crate::observability::metrics;
use crate::rpc::{HttpRpcInvoker, RpcError};

/// Fatal errors while bringing the gateway up or serving.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("failed to build RPC client: {0}")]
    Rpc(#[from] RpcError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the worker runtime.
pub fn build_runtime(config: &RuntimeConfig) -> std::io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder.enable_all().thread_name("gateway-worker");
    if let Some(threads) = config.worker_threads {
        builder.worker_threads(threads);
    }
    builder.build()
}

/// Run the gateway until a termination signal has been handled.
pub async fn run(config: GatewayConfig) -> Result<(), GatewayError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.rpc.upstream_url,
        auth_enabled = config.auth.enabled,
        shutdown_timeout_ms = config.shutdown.timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let invoker = Arc::new(HttpRpcInvoker::new(&config.rpc)?);
    let shutdown = Shutdown::new(DrainPolicy::from(&config.shutdown));
    let server = HttpServer::new(&config, invoker);

    let listener = listener::bind(&config.listener).await?;
    let signals = spawn_signal_listener(shutdown.clone());

    server.run(listener, shutdown.clone()).await?;
    signals.abort();

    if let Some(report) = shutdown.report() {
        tracing::info!(outcome = ?report.outcome, attempts = report.attempts, "Gateway stopped");
    }
    Ok(())
}
