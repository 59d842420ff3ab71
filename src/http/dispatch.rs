//! Per-request dispatch.
//!
//! # Flow
//! ```text
//! RECEIVED → CLASSIFIED (by method)
//!     GET/HEAD → health check | echo RPC | canned "unsupported"
//!     POST     → fields → resolver → [auth] → RPC_PENDING → envelope
//!     other    → canned "unsupported"
//! → RESPONDED
//! ```
//!
//! Failures never become HTTP errors here: refused or failed calls are answered
//! with HTTP 200 and a `status: 0` envelope.

use std::time::Instant;

use axum::body::{self, Body};
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;

use crate::health::HealthStatus;
use crate::http::envelope;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::{match_echo_url, RequestFields};
use crate::rpc::RpcRequest;

pub const HEALTH_CHECK_PATH: &str = "/health/check";
pub const ECHO_METHOD: &str = "echo";
pub const ECHO_PARAMETER: &str = "{}";

pub const GATEWAY_RUNNING: &str = "gateway is running";
pub const GATEWAY_SHUTTING_DOWN: &str = "gateway is shutting down";
pub const UNSUPPORTED_REQUEST: &str = "unsupported request type";
pub const BODY_TOO_LARGE: &str = "request body too large";
pub const MISSING_TARGET_CAUSE: &str = "service and method are required";

/// Metric label for the request class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Health,
    Echo,
    Rpc,
    Unsupported,
}

impl Kind {
    fn as_str(self) -> &'static str {
        match self {
            Kind::Health => "health",
            Kind::Echo => "echo",
            Kind::Rpc => "rpc",
            Kind::Unsupported => "unsupported",
        }
    }
}

/// Entry point for every request.
pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    match *request.method() {
        Method::GET | Method::HEAD => handle_get(&state, request.uri().path(), start).await,
        Method::POST => handle_post(&state, request, start).await,
        _ => unsupported(start),
    }
}

async fn handle_get(state: &AppState, path: &str, start: Instant) -> Response {
    if path == HEALTH_CHECK_PATH {
        return health_check(state, start);
    }

    match match_echo_url(path) {
        Some(target) => {
            tracing::debug!(service = %target.service, version = %target.version, "Echo request");
            let request = RpcRequest::new(target.service, target.version, ECHO_METHOD, ECHO_PARAMETER);
            invoke(state, request, Kind::Echo, start).await
        }
        None => unsupported(start),
    }
}

fn health_check(state: &AppState, start: Instant) -> Response {
    let response = match state.health.status() {
        HealthStatus::Green => envelope::text(StatusCode::OK, GATEWAY_RUNNING),
        HealthStatus::Yellow => envelope::text(StatusCode::SERVICE_UNAVAILABLE, GATEWAY_SHUTTING_DOWN),
    };
    metrics::record_request(Kind::Health.as_str(), "ok", start);
    response
}

fn unsupported(start: Instant) -> Response {
    metrics::record_request(Kind::Unsupported.as_str(), "ok", start);
    envelope::text(StatusCode::OK, UNSUPPORTED_REQUEST)
}

async fn handle_post(state: &AppState, request: Request<Body>, start: Instant) -> Response {
    let (parts, body) = request.into_parts();
    let uri = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let bytes = match body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(uri = %uri, error = %e, "Failed to aggregate request body");
            metrics::record_request(Kind::Rpc.as_str(), "body_rejected", start);
            return envelope::text(StatusCode::PAYLOAD_TOO_LARGE, BODY_TOO_LARGE);
        }
    };

    let fields = RequestFields::from_request(uri, &parts.headers, &bytes);
    let call = state.resolver.resolve(uri, &parts.headers, &fields);

    if let Some(cause) = call.cause() {
        tracing::info!(uri = %uri, cause = %cause, "Illegal request");
        metrics::record_request(Kind::Rpc.as_str(), "illegal", start);
        return envelope::json(envelope::illegal_request(cause));
    }

    if let Some(authenticator) = &state.authenticator {
        if let Err(rejection) = authenticator.authenticate(&call) {
            tracing::warn!(
                uri = %uri,
                api_key = call.api_key().unwrap_or_default(),
                reason = %rejection,
                "Authentication rejected"
            );
            metrics::record_request(Kind::Rpc.as_str(), "auth_rejected", start);
            return envelope::json(envelope::auth_rejected(&rejection));
        }
    }

    let Some(target) = call.rpc_target() else {
        tracing::info!(uri = %uri, cause = MISSING_TARGET_CAUSE, "Illegal request");
        metrics::record_request(Kind::Rpc.as_str(), "illegal", start);
        return envelope::json(envelope::illegal_request(MISSING_TARGET_CAUSE));
    };

    let request = RpcRequest::new(target.service, target.version, target.method, target.parameter);
    invoke(state, request, Kind::Rpc, start).await
}

/// Issue one RPC and turn its outcome into an envelope.
async fn invoke(state: &AppState, request: RpcRequest, kind: Kind, start: Instant) -> Response {
    tracing::debug!(
        service = %request.service,
        version = %request.version,
        method = %request.method,
        "Invoking RPC"
    );

    let service = request.service.clone();
    let method = request.method.clone();
    let rpc_start = Instant::now();
    let outcome = state.invoker.invoke(request).await;
    metrics::record_rpc(outcome.is_ok(), rpc_start);

    match outcome {
        Ok(result) => {
            metrics::record_request(kind.as_str(), "success", start);
            envelope::json(envelope::inject_status(&result))
        }
        Err(e) => {
            tracing::warn!(service = %service, method = %method, error = %e, "RPC failed");
            metrics::record_request(kind.as_str(), "rpc_failure", start);
            envelope::json(envelope::rpc_failure(&e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::http::header;
    use futures_util::future::{BoxFuture, FutureExt};
    use tower::ServiceExt;

    use super::*;
    use crate::config::GatewayConfig;
    use crate::http::server::HttpServer;
    use crate::rpc::{RpcError, RpcInvoker, RpcResult};

    /// Records every call and answers with a fixed result.
    struct Recorder {
        calls: Mutex<Vec<RpcRequest>>,
        answer: Result<&'static str, &'static str>,
    }

    impl Recorder {
        fn new(answer: Result<&'static str, &'static str>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                answer,
            })
        }

        fn calls(&self) -> Vec<RpcRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RpcInvoker for Recorder {
        fn invoke(&self, request: RpcRequest) -> BoxFuture<'static, RpcResult<String>> {
            self.calls.lock().unwrap().push(request);
            let answer = self
                .answer
                .map(str::to_string)
                .map_err(|e| RpcError::Service(e.to_string()));
            async move { answer }.boxed()
        }
    }

    async fn send(server: &HttpServer, request: Request<Body>) -> (StatusCode, String) {
        let response = server.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri).body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_follows_status() {
        let server = HttpServer::new(&GatewayConfig::default(), Recorder::new(Ok("{}")));
        assert_eq!(
            send(&server, get(HEALTH_CHECK_PATH)).await,
            (StatusCode::OK, GATEWAY_RUNNING.to_string())
        );

        server.health().mark_draining();
        assert_eq!(
            send(&server, get(HEALTH_CHECK_PATH)).await,
            (StatusCode::SERVICE_UNAVAILABLE, GATEWAY_SHUTTING_DOWN.to_string())
        );
    }

    #[tokio::test]
    async fn unknown_get_and_other_methods_are_unsupported() {
        let rpc = Recorder::new(Ok("{}"));
        let server = HttpServer::new(&GatewayConfig::default(), rpc.clone());
        assert_eq!(
            send(&server, get("/api/svc/1.0/run")).await,
            (StatusCode::OK, UNSUPPORTED_REQUEST.to_string())
        );
        let delete = Request::delete("/api/svc/1.0/run").body(Body::empty()).unwrap();
        assert_eq!(
            send(&server, delete).await,
            (StatusCode::OK, UNSUPPORTED_REQUEST.to_string())
        );
        assert!(rpc.calls().is_empty());
    }

    #[tokio::test]
    async fn head_is_answered_like_get_without_body() {
        let rpc = Recorder::new(Ok("{}"));
        let server = HttpServer::new(&GatewayConfig::default(), rpc.clone());

        let head = |uri: &str| Request::head(uri).body(Body::empty()).unwrap();
        assert_eq!(
            send(&server, head(HEALTH_CHECK_PATH)).await,
            (StatusCode::OK, String::new())
        );
        assert_eq!(
            send(&server, head("/api/svc/1.0/run")).await,
            (StatusCode::OK, String::new())
        );
        assert!(rpc.calls().is_empty());

        server.health().mark_draining();
        let (status, _) = send(&server, head(HEALTH_CHECK_PATH)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        assert_eq!(
            send(&server, head("/api/echo/com.x.Service/1.0.0")).await,
            (StatusCode::OK, String::new())
        );
        assert_eq!(rpc.calls().len(), 1);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_and_not_left_in_flight() {
        let mut config = GatewayConfig::default();
        config.listener.max_body_bytes = 8;
        let rpc = Recorder::new(Ok("{}"));
        let server = HttpServer::new(&config, rpc.clone());

        let (status, _) = send(&server, post("/api/svc/1.0/run", r#"{"payload":"too long"}"#)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(rpc.calls().is_empty());
        assert_eq!(server.in_flight().active(), 0);

        let (status, body) = send(&server, post("/api/svc/1.0/run", "{}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"status":1}"#);
        assert_eq!(server.in_flight().active(), 0);
    }

    #[tokio::test]
    async fn post_forwards_call_and_injects_status() {
        let rpc = Recorder::new(Ok(r#"{"a":1}"#));
        let server = HttpServer::new(&GatewayConfig::default(), rpc.clone());

        let (status, body) = send(&server, post("/api/svc/1.0/run", r#"{"x":2}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"a":1,"status":1}"#);
        assert_eq!(
            rpc.calls(),
            vec![RpcRequest::new("svc", "1.0", "run", r#"{"x":2}"#)]
        );
    }

    #[tokio::test]
    async fn rpc_failure_is_enveloped_with_ok_status() {
        let server = HttpServer::new(&GatewayConfig::default(), Recorder::new(Err("boom")));
        let (status, body) = send(&server, post("/api/svc/1.0/run", "{}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, envelope::rpc_failure("boom"));
    }

    #[tokio::test]
    async fn illegal_uri_skips_rpc() {
        let rpc = Recorder::new(Ok("{}"));
        let server = HttpServer::new(&GatewayConfig::default(), rpc.clone());

        let (_, body) = send(&server, post("/a/b/c", "{}")).await;
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["responseCode"], envelope::ILLEGAL_REQUEST_CODE);
        assert_eq!(parsed["status"], 0);
        assert!(rpc.calls().is_empty());
    }

    #[tokio::test]
    async fn short_grammar_without_target_is_illegal() {
        let rpc = Recorder::new(Ok("{}"));
        let server = HttpServer::new(&GatewayConfig::default(), rpc.clone());

        let (_, body) = send(&server, post("/api", "")).await;
        assert_eq!(body, envelope::illegal_request(MISSING_TARGET_CAUSE));
        assert!(rpc.calls().is_empty());
    }

    #[tokio::test]
    async fn short_grammar_reads_form_fields() {
        let rpc = Recorder::new(Ok("{}"));
        let server = HttpServer::new(&GatewayConfig::default(), rpc.clone());

        let request = Request::post("/api")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("serviceName=svc&version=2.0&methodName=run&parameter=%7B%7D"))
            .unwrap();
        let (_, body) = send(&server, request).await;
        assert_eq!(body, r#"{"status":1}"#);
        assert_eq!(rpc.calls(), vec![RpcRequest::new("svc", "2.0", "run", "{}")]);
    }

    #[tokio::test]
    async fn echo_invokes_echo_method() {
        let rpc = Recorder::new(Ok("{}"));
        let server = HttpServer::new(&GatewayConfig::default(), rpc.clone());

        let (_, body) = send(&server, get("/api/echo/com.x.Service/1.0.0")).await;
        assert_eq!(body, r#"{"status":1}"#);
        assert_eq!(
            rpc.calls(),
            vec![RpcRequest::new("com.x.Service", "1.0.0", ECHO_METHOD, ECHO_PARAMETER)]
        );
    }

    #[tokio::test]
    async fn auth_rejection_short_circuits() {
        let mut config = GatewayConfig::default();
        config.auth.enabled = true;
        config.auth.keys = HashMap::from([("key1".to_string(), "s3cret".to_string())]);
        let rpc = Recorder::new(Ok("{}"));
        let server = HttpServer::new(&config, rpc.clone());

        let (_, body) = send(&server, post("/api/svc/1.0/run", "{}")).await;
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["responseCode"], envelope::AUTH_REJECTED_CODE);
        assert!(rpc.calls().is_empty());

        let (_, body) = send(
            &server,
            post("/api/svc/1.0/run/key1?timestamp=1&secret=s3cret", "{}"),
        )
        .await;
        assert_eq!(body, r#"{"status":1}"#);
        assert_eq!(rpc.calls().len(), 1);

        let (_, body) = send(
            &server,
            post("/api/svc/1.0/run/key1?timestamp=1&secret=s3cret&", "{}"),
        )
        .await;
        assert_eq!(body, r#"{"status":1}"#);
        assert_eq!(rpc.calls().len(), 2);
    }

    #[tokio::test]
    async fn responses_close_connection_and_carry_request_id() {
        let server = HttpServer::new(&GatewayConfig::default(), Recorder::new(Ok("{}")));
        let response = server.router().oneshot(get(HEALTH_CHECK_PATH)).await.unwrap();
        assert_eq!(response.headers()[header::CONNECTION], "close");
        assert!(response.headers().contains_key("x-request-id"));
    }
}
