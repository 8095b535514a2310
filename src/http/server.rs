//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the status and proxy handlers
//! - Wire up middleware (request ID, tracing)
//! - Own the shared state: stats store, token issuer, upstream session
//! - Serve until shutdown, then close the upstream session

use std::sync::Arc;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::handlers::{proxy_handler, status_handler};
use crate::http::request::request_id;
use crate::identity::TokenIssuer;
use crate::lifecycle::shutdown::wait as shutdown_requested;
use crate::stats::StatsStore;
use crate::upstream::{UpstreamError, UpstreamSession};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub stats: Arc<StatsStore>,
    pub issuer: Arc<TokenIssuer>,
    pub upstream: Arc<UpstreamSession>,
    pub max_body_size: usize,
}

impl AppState {
    /// Initialize the stats store and open the upstream session.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            stats: Arc::new(StatsStore::new()),
            issuer: Arc::new(TokenIssuer::from_config(&config.token)),
            upstream: Arc::new(UpstreamSession::open(&config.upstream)?),
            max_body_size: config.limits.max_body_size,
        })
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, UpstreamError> {
        let state = AppState::from_config(&config)?;
        let router = build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Run the server until `shutdown` fires, then drain and close upstream.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.state.upstream.endpoint(),
            started_at = %self.state.stats.started_at(),
            "HTTP server starting"
        );

        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_requested(shutdown))
            .await;

        self.state.upstream.close();
        tracing::info!(
            request_count = self.state.stats.request_count(),
            "HTTP server stopped"
        );
        result
    }

    /// A handle to the router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn stats(&self) -> Arc<StatsStore> {
        self.state.stats.clone()
    }

    pub fn upstream(&self) -> Arc<UpstreamSession> {
        self.state.upstream.clone()
    }
}

/// Build the Axum router with all middleware layers.
///
/// `POST /status` is proxied like any other path; other method/path
/// combinations get axum's 404/405.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_body_size;
    Router::new()
        .route("/status", get(status_handler).post(proxy_handler))
        .route("/", post(proxy_handler))
        .route("/{*path}", post(proxy_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id = %request_id(req.headers()),
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
