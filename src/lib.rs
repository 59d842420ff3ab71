//! HTTP-to-RPC gateway library.
//!
//! Maps REST-like and query-parameter URLs onto internal RPC calls, answers
//! load-balancer health checks, and drains in-flight work on shutdown.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod rpc;
pub mod security;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use lifecycle::startup::GatewayError;
