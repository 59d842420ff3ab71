//! RPC gateway (v1)
//!
//! An HTTP-to-RPC edge gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌──────────────────────────────────────────────────┐
//!                              │                   RPC GATEWAY                     │
//!                              │                                                   │
//!     Client Request           │  ┌─────────┐    ┌──────────┐    ┌────────────┐   │
//!     ─────────────────────────┼─▶│   net   │───▶│   http   │───▶│  routing   │   │
//!                              │  │listener │    │ dispatch │    │  resolver  │   │
//!                              │  └─────────┘    └──────────┘    └─────┬──────┘   │
//!                              │                                       │          │
//!                              │                                       ▼          │
//!                              │                                ┌────────────┐    │
//!                              │                                │  security  │    │
//!                              │                                │   (auth)   │    │
//!                              │                                └─────┬──────┘    │
//!                              │                                      ▼           │
//!     Client Response          │  ┌──────────┐                  ┌────────────┐    │
//!     ◀────────────────────────┼──│ envelope │◀─────────────────│    rpc     │◀───┼──── Internal
//!                              │  └──────────┘                  │  invoker   │    │     RPC layer
//!                              │                                └────────────┘    │
//!                              │  ┌────────────────────────────────────────────┐  │
//!                              │  │            Cross-Cutting Concerns          │  │
//!                              │  │  config · health · observability ·         │  │
//!                              │  │  lifecycle (startup / graceful drain)      │  │
//!                              │  └────────────────────────────────────────────┘  │
//!                              └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use rpc_gateway::config::{load_config, validate_config, ConfigError, GatewayConfig};
use rpc_gateway::lifecycle::startup::{self, build_runtime, GatewayError};
use rpc_gateway::observability::logging::init_logging;

/// Command-line flags. Each one overrides the matching config file value.
#[derive(Debug, Parser)]
#[command(name = "rpc-gateway", version, about = "HTTP-to-RPC gateway")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:9000.
    #[arg(long, env = "GATEWAY_BIND")]
    bind: Option<String>,

    /// Number of worker threads.
    #[arg(long, env = "GATEWAY_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Enable apiKey authentication.
    #[arg(long, env = "GATEWAY_AUTH_ENABLE")]
    auth_enable: Option<bool>,

    /// Drain wait budget in milliseconds.
    #[arg(long, env = "GATEWAY_SHUTDOWN_TIMEOUT_MS")]
    shutdown_timeout_ms: Option<u64>,

    /// Delay between going Yellow and draining, in milliseconds.
    #[arg(long, env = "GATEWAY_QUIESCENCE_MS")]
    quiescence_ms: Option<u64>,

    /// Base URL of the internal RPC layer.
    #[arg(long, env = "GATEWAY_RPC_UPSTREAM")]
    rpc_upstream: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut GatewayConfig) {
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(threads) = self.worker_threads {
            config.runtime.worker_threads = Some(threads);
        }
        if let Some(enabled) = self.auth_enable {
            config.auth.enabled = enabled;
        }
        if let Some(timeout) = self.shutdown_timeout_ms {
            config.shutdown.timeout_ms = timeout;
        }
        if let Some(quiescence) = self.quiescence_ms {
            config.shutdown.quiescence_ms = quiescence;
        }
        if let Some(upstream) = self.rpc_upstream {
            config.rpc.upstream_url = upstream;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path).map_err(GatewayError::from)?,
        None => GatewayConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config)
        .map_err(|errors| GatewayError::from(ConfigError::Validation(errors)))?;

    init_logging(&config.observability).map_err(GatewayError::from)?;
    tracing::info!("rpc-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let runtime = build_runtime(&config.runtime)?;
    let grace = config.shutdown.poll_interval();
    runtime.block_on(startup::run(config))?;
    runtime.shutdown_timeout(grace.max(Duration::from_millis(100)));

    tracing::info!("Shutdown complete");
    Ok(())
}
