//! RPC collaborator subsystem.
//!
//! # Data Flow
//! ```text
//! CallDescriptor (legal)
//!     → RpcRequest (service, version, method, parameter)
//!     → RpcInvoker::invoke (returns a future immediately)
//!     → JSON result text | RpcError
//! ```
//!
//! # Design Decisions
//! - One async call per request, no pooling policy beyond the client's own
//! - The wire protocol lives behind the `RpcInvoker` trait

pub mod client;
pub mod types;

pub use client::HttpRpcInvoker;
pub use types::{RpcError, RpcInvoker, RpcRequest, RpcResult};
