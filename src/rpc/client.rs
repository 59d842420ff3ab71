//! HTTP-forwarding RPC invoker.
//!
//! Posts the parameter payload to `{upstream}/{service}/{version}/{method}` and
//! hands back the response body. Timeouts are the client's own; the gateway adds
//! no deadline of its own.

use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::config::RpcConfig;
use crate::rpc::types::{RpcError, RpcInvoker, RpcRequest, RpcResult};

#[derive(Debug, Clone)]
pub struct HttpRpcInvoker {
    client: reqwest::Client,
    upstream: Url,
}

impl HttpRpcInvoker {
    pub fn new(config: &RpcConfig) -> RpcResult<Self> {
        let upstream = Url::parse(&config.upstream_url)
            .map_err(|e| RpcError::Transport(format!("invalid upstream url: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        Ok(Self { client, upstream })
    }

    /// Upstream URL for one call.
    fn call_url(&self, request: &RpcRequest) -> RpcResult<Url> {
        let mut url = self.upstream.clone();
        url.path_segments_mut()
            .map_err(|_| RpcError::Transport("upstream url cannot carry a path".into()))?
            .pop_if_empty()
            .extend([&request.service, &request.version, &request.method]);
        Ok(url)
    }
}

impl RpcInvoker for HttpRpcInvoker {
    fn invoke(&self, request: RpcRequest) -> BoxFuture<'static, RpcResult<String>> {
        let client = self.client.clone();
        let url = self.call_url(&request);

        async move {
            let url = url?;
            tracing::debug!(url = %url, service = %request.service, method = %request.method, "Forwarding RPC");

            let response = client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(request.parameter)
                .send()
                .await
                .map_err(|e| RpcError::Transport(e.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| RpcError::Transport(e.to_string()))?;

            if !status.is_success() {
                return Err(RpcError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok(body)
        }
        .boxed()
    }
}
