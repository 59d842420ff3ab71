//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful serve loop)
//!     → request.rs (request ID)
//!     → dispatch.rs (classify by method, health / echo / RPC)
//!     → envelope.rs (status injection, error envelopes)
//!     → Send to client, close connection
//! ```

pub mod dispatch;
pub mod envelope;
pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
