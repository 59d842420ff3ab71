//! RPC request / error types and the invoker seam.

use futures_util::future::BoxFuture;
use thiserror::Error;

/// One call forwarded to the internal RPC layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcRequest {
    pub service: String,
    pub version: String,
    pub method: String,
    pub parameter: String,
}

impl RpcRequest {
    pub fn new(
        service: impl Into<String>,
        version: impl Into<String>,
        method: impl Into<String>,
        parameter: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            method: method.into(),
            parameter: parameter.into(),
        }
    }
}

/// Errors that can occur while invoking an RPC.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The call never produced a response (connect, timeout, body read).
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// The RPC layer answered with a failure status.
    #[error("RPC upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The service itself reported a failure.
    #[error("{0}")]
    Service(String),
}

/// Result type for RPC invocations.
pub type RpcResult<T> = Result<T, RpcError>;

/// The internal RPC layer.
///
/// `invoke` returns immediately; the future resolves with the JSON result text
/// and may be polled to completion on any worker thread.
pub trait RpcInvoker: Send + Sync {
    fn invoke(&self, request: RpcRequest) -> BoxFuture<'static, RpcResult<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RpcError::Transport("connection refused".into());
        assert_eq!(err.to_string(), "RPC transport error: connection refused");

        let err = RpcError::Upstream {
            status: 502,
            body: "bad gateway".into(),
        };
        assert!(err.to_string().contains("502"));

        let err = RpcError::Service("no such method".into());
        assert_eq!(err.to_string(), "no such method");
    }
}
