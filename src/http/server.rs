//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the admin and proxy handlers
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener and shut down gracefully
//! - Fan proxied requests out to every backend and relay the winner

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::Instrument;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::admin;
use crate::config::{AdminConfig, ProxyConfig};
use crate::fanout::{
    buffer_body, relay, replicate, FanoutError, HyperTransport, RaceCoordinator, RaceOutcome,
};
use crate::http::request::{request_id, MakeRequestUuid};
use crate::observability::metrics;
use crate::registry::{BackendRegistry, BackendSnapshot};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<BackendRegistry>,
    pub coordinator: Arc<RaceCoordinator<HyperTransport>>,
    pub max_body_bytes: usize,
    pub relay_idle_timeout: Duration,
    pub admin: AdminConfig,
}

/// HTTP server for the fan-out proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server around an already-seeded registry.
    pub fn new(config: ProxyConfig, registry: Arc<BackendRegistry>) -> Self {
        let coordinator = Arc::new(RaceCoordinator::from_config(
            HyperTransport::new(),
            &config.fanout,
        ));

        let state = AppState {
            registry,
            coordinator,
            max_body_bytes: config.fanout.max_body_bytes,
            relay_idle_timeout: config.fanout.relay_idle_timeout(),
            admin: config.admin.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route(&config.admin.update_path, any(admin::update_backends))
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            update_path = %self.config.admin.update_path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Snapshots the backend set, fans the request out and relays the first success.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let snapshot = state.registry.snapshot();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %request.uri(),
        backends = snapshot.len(),
        "Received request"
    );

    // Detached loser tasks inherit this span, keeping their events tied to the request.
    let span = tracing::info_span!("fan_out", request_id = %request_id);
    let response = match fan_out(&state, snapshot, request, &request_id)
        .instrument(span)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Fan-out failed");
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

async fn fan_out(
    state: &AppState,
    snapshot: BackendSnapshot,
    request: Request<Body>,
    request_id: &str,
) -> Result<Response, FanoutError> {
    let (parts, body) = request.into_parts();
    let body = buffer_body(body, state.max_body_bytes).await?;
    let replicas = replicate(&parts, &body, &snapshot);

    match state.coordinator.race(replicas).await {
        RaceOutcome::Winner(winner) => {
            tracing::info!(
                request_id = %request_id,
                backend = %winner.backend,
                status = %winner.response.status(),
                elapsed_ms = winner.elapsed.as_millis() as u64,
                "Success from backend"
            );
            Ok(relay(winner, state.relay_idle_timeout))
        }
        RaceOutcome::AggregateFailure(failure) => Err(FanoutError::AllBackendsFailed(failure)),
    }
}
