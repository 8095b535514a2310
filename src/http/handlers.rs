//! Request handlers for the two routes the gateway serves.

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, State},
    http::Request,
    response::{IntoResponse, Response},
    Json,
};

use crate::http::request::{has_body, request_id};
use crate::http::response::{relay, GatewayError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::stats::StatsSnapshot;

/// `GET /status`: uptime and request count.
pub async fn status_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    let start = Instant::now();
    let snapshot = state.stats.snapshot();
    metrics::record_request("status", 200, start);
    Json(snapshot)
}

/// `POST /{*path}`: sign, forward to the fixed upstream, relay the answer.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let path = request.uri().path().to_string();

    tracing::debug!(request_id = %request_id, path = %path, "Proxying request");

    let response = match forward(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            if matches!(e, GatewayError::Upstream(_)) {
                metrics::record_upstream_error();
            }
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Proxy request failed");
            e.into_response()
        }
    };

    metrics::record_request("proxy", response.status().as_u16(), start);
    response
}

async fn forward(state: &AppState, request: Request<Body>) -> Result<Response, GatewayError> {
    let token = state.issuer.issue_default()?;

    let query = request.uri().query().map(str::to_owned);
    let body = if has_body(request.headers()) {
        // Buffered under the router's `DefaultBodyLimit`.
        Some(
            Bytes::from_request(request, &())
                .await
                .map_err(GatewayError::BodyRead)?,
        )
    } else {
        None
    };

    let upstream = state
        .upstream
        .forward(query.as_deref(), body, &token)
        .await?;

    let total = state.stats.increment();
    tracing::debug!(
        status = %upstream.status,
        request_count = total,
        "Upstream response relayed"
    );

    Ok(relay(upstream))
}
