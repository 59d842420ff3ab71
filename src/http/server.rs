//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the dispatch handler
//! - Wire up middleware (request ID, tracing, body limit, panic catching,
//!   in-flight tracking, `Connection: close`)
//! - Serve on a bound listener until the shutdown sequence has finished

use std::any::Any;
use std::future::IntoFuture;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::health::HealthState;
use crate::http::dispatch::dispatch;
use crate::http::envelope;
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::Shutdown;
use crate::net::InFlightTracker;
use crate::routing::UrlMappingResolver;
use crate::rpc::RpcInvoker;
use crate::security::{Authenticator, KeySecretAuthenticator};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<UrlMappingResolver>,
    pub invoker: Arc<dyn RpcInvoker>,
    /// Present only when authentication is enabled.
    pub authenticator: Option<Arc<dyn Authenticator>>,
    pub health: HealthState,
    pub max_body_bytes: usize,
}

/// HTTP front of the gateway.
pub struct HttpServer {
    router: Router,
    health: HealthState,
    in_flight: InFlightTracker,
}

impl HttpServer {
    /// Create a new HTTP server forwarding calls to `invoker`.
    pub fn new(config: &GatewayConfig, invoker: Arc<dyn RpcInvoker>) -> Self {
        let health = HealthState::new();
        let in_flight = InFlightTracker::new();

        let authenticator = config.auth.enabled.then(|| {
            Arc::new(KeySecretAuthenticator::new(config.auth.keys.clone())) as Arc<dyn Authenticator>
        });

        let state = AppState {
            resolver: Arc::new(UrlMappingResolver::new()),
            invoker,
            authenticator,
            health: health.clone(),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(state, in_flight.clone(), config.listener.max_body_bytes);
        Self {
            router,
            health,
            in_flight,
        }
    }

    /// Build the Axum router with all middleware layers, outermost first.
    fn build_router(state: AppState, in_flight: InFlightTracker, max_body_bytes: usize) -> Router {
        let layers = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetResponseHeaderLayer::overriding(
                header::CONNECTION,
                HeaderValue::from_static("close"),
            ))
            .layer(CatchPanicLayer::custom(handle_panic))
            // Outside the body limit: `from_fn` only accepts an unwrapped `Body`.
            .layer(middleware::from_fn_with_state(in_flight, track_in_flight))
            .layer(RequestBodyLimitLayer::new(max_body_bytes));

        Router::new()
            .route("/", any(dispatch))
            .route("/{*path}", any(dispatch))
            .with_state(state)
            .layer(layers)
    }

    /// Shared health handle, flipped Yellow by the shutdown sequence.
    pub fn health(&self) -> HealthState {
        self.health.clone()
    }

    /// Shared in-flight counter.
    pub fn in_flight(&self) -> InFlightTracker {
        self.in_flight.clone()
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` is triggered and its sequence has run, then stop
    /// accepting and let open connections finish.
    ///
    /// Connections still open after the drain get one more `policy().timeout` to
    /// close; after that they are abandoned and this returns.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let drained = {
            let shutdown = shutdown.clone();
            let health = self.health.clone();
            let in_flight = self.in_flight.clone();
            async move {
                shutdown.triggered().await;
                shutdown.execute(&health, &in_flight).await;
                tracing::info!("Closing listener");
            }
        };

        let grace = shutdown.policy().timeout;
        let connections_deadline = {
            let health = self.health.clone();
            let in_flight = self.in_flight.clone();
            async move {
                shutdown.triggered().await;
                shutdown.execute(&health, &in_flight).await;
                tokio::time::sleep(grace).await;
                in_flight.active()
            }
        };

        let serve = axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(drained)
            .into_future();

        tokio::select! {
            result = serve => result?,
            remaining = connections_deadline => {
                tracing::warn!(
                    in_flight = remaining,
                    grace_ms = grace.as_millis() as u64,
                    "Connections still open after drain, abandoning them"
                );
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Count the request for as long as the inner service works on it.
async fn track_in_flight(
    State(in_flight): State<InFlightTracker>,
    request: Request,
    next: Next,
) -> Response {
    let _guard = in_flight.track();
    next.run(request).await
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "Request handler panicked");
    envelope::text(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
}
