//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use rpc_gateway::config::GatewayConfig;
use rpc_gateway::health::HealthState;
use rpc_gateway::http::HttpServer;
use rpc_gateway::lifecycle::{DrainPolicy, Shutdown};
use rpc_gateway::net::InFlightTracker;
use rpc_gateway::rpc::{RpcError, RpcInvoker, RpcRequest, RpcResult};

/// Mock RPC layer driven by a closure.
pub struct ProgrammableRpc<F> {
    handler: F,
    calls: AtomicUsize,
}

impl<F> ProgrammableRpc<F> {
    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> RpcInvoker for ProgrammableRpc<F>
where
    F: Fn(RpcRequest) -> BoxFuture<'static, RpcResult<String>> + Send + Sync,
{
    fn invoke(&self, request: RpcRequest) -> BoxFuture<'static, RpcResult<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.handler)(request)
    }
}

pub fn programmable_rpc<F>(handler: F) -> Arc<ProgrammableRpc<F>>
where
    F: Fn(RpcRequest) -> BoxFuture<'static, RpcResult<String>> + Send + Sync,
{
    Arc::new(ProgrammableRpc {
        handler,
        calls: AtomicUsize::new(0),
    })
}

/// Answers every call with `body` after `delay`.
#[allow(dead_code)]
pub fn fixed_rpc(
    body: &'static str,
    delay: Duration,
) -> Arc<ProgrammableRpc<impl Fn(RpcRequest) -> BoxFuture<'static, RpcResult<String>> + Send + Sync>> {
    programmable_rpc(move |_| {
        async move {
            tokio::time::sleep(delay).await;
            Ok(body.to_string())
        }
        .boxed()
    })
}

/// Fails every call with `message`.
#[allow(dead_code)]
pub fn failing_rpc(
    message: &'static str,
) -> Arc<ProgrammableRpc<impl Fn(RpcRequest) -> BoxFuture<'static, RpcResult<String>> + Send + Sync>> {
    programmable_rpc(move |_| async move { Err(RpcError::Service(message.to_string())) }.boxed())
}

/// A gateway serving on an ephemeral local port.
#[allow(dead_code)]
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub health: HealthState,
    pub in_flight: InFlightTracker,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_gateway(config: GatewayConfig, invoker: Arc<dyn RpcInvoker>) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(&config, invoker);
    let health = server.health();
    let in_flight = server.in_flight();
    let shutdown = Shutdown::new(DrainPolicy::from(&config.shutdown));
    let handle = tokio::spawn(server.run(listener, shutdown.clone()));

    TestGateway {
        addr,
        shutdown,
        health,
        in_flight,
        handle,
    }
}

/// HTTP client that never reuses connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
