//! Shared utilities for integration and load testing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Query,
    http::{header, HeaderMap, StatusCode, Uri},
    routing::any,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use jwt_gateway::config::GatewayConfig;
use jwt_gateway::http::HttpServer;
use jwt_gateway::lifecycle::Shutdown;
use jwt_gateway::stats::StatsStore;
use jwt_gateway::upstream::UpstreamSession;

/// Echo the request back the way postman-echo's `/post` does.
async fn echo(
    Query(args): Query<HashMap<String, String>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let framed = headers.contains_key(header::CONTENT_LENGTH)
        || headers.contains_key(header::TRANSFER_ENCODING);
    let data = if framed {
        Value::String(String::from_utf8_lossy(&body).into_owned())
    } else {
        Value::Null
    };
    let headers: serde_json::Map<String, Value> = headers
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_str().unwrap_or_default().to_string())))
        .collect();

    Json(json!({
        "args": args,
        "headers": headers,
        "data": data,
        "path": uri.path(),
    }))
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Start an echoing upstream on a free port.
pub async fn start_echo_backend() -> SocketAddr {
    serve(
        Router::new()
            .route("/", any(echo))
            .route("/{*path}", any(echo)),
    )
    .await
}

/// Start an upstream that always answers with the given response.
#[allow(dead_code)]
pub async fn start_fixed_backend(
    status: StatusCode,
    content_type: &'static str,
    body: &'static str,
) -> SocketAddr {
    let handler = move || async move { (status, [(header::CONTENT_TYPE, content_type)], body) };
    serve(
        Router::new()
            .route("/", any(handler))
            .route("/{*path}", any(handler)),
    )
    .await
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A running gateway and the handles tests inspect.
#[allow(dead_code)]
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub stats: Arc<StatsStore>,
    pub upstream: Arc<UpstreamSession>,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a gateway forwarding to `upstream`.
pub async fn start_gateway(upstream: SocketAddr) -> TestGateway {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = format!("http://{}", upstream);
    config.upstream.system_proxy = false;

    let server = HttpServer::new(config).unwrap();
    let stats = server.stats();
    let upstream = server.upstream();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    TestGateway {
        addr,
        shutdown,
        stats,
        upstream,
        handle,
    }
}

/// Test client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
