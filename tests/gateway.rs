//! End-to-end tests: client → gateway → local echo upstream.

use std::collections::HashSet;
use std::time::Duration;

use axum::http::StatusCode;
use jwt_gateway::identity::TokenIssuer;
use serde_json::{json, Value};

mod common;

async fn status(client: &reqwest::Client, gw: &common::TestGateway) -> Value {
    let res = client.get(gw.url("/status")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn proxy_attaches_signed_token() {
    let upstream = common::start_echo_backend().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    let res = client.post(gw.url("/anything")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let data: Value = res.json().await.unwrap();
    let token = data["headers"]["x-my-jwt"]
        .as_str()
        .expect("x-my-jwt header forwarded");
    let claims = TokenIssuer::default().verify(token).unwrap();
    assert_eq!(claims.user, "username");

    gw.shutdown.trigger();
}

#[tokio::test]
async fn query_parameters_are_forwarded() {
    let upstream = common::start_echo_backend().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    let res = client.post(gw.url("/anything?a=1&b=2")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let data: Value = res.json().await.unwrap();
    assert_eq!(data["args"], json!({"a": "1", "b": "2"}));

    gw.shutdown.trigger();
}

#[tokio::test]
async fn inbound_path_is_replaced_by_fixed_upstream_path() {
    let upstream = common::start_echo_backend().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    for path in ["/", "/anything", "/deeply/nested/path"] {
        let res = client.post(gw.url(path)).send().await.unwrap();
        let data: Value = res.json().await.unwrap();
        assert_eq!(data["path"], "/post", "inbound path {} leaked upstream", path);
    }

    gw.shutdown.trigger();
}

#[tokio::test]
async fn missing_body_is_not_forwarded() {
    let upstream = common::start_echo_backend().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    let res = client.post(gw.url("/anything")).send().await.unwrap();
    let data: Value = res.json().await.unwrap();
    assert!(
        data["data"].is_null(),
        "unexpected body forwarded: {}",
        data["data"]
    );
    assert!(data["headers"].get("content-length").is_none());

    gw.shutdown.trigger();
}

#[tokio::test]
async fn explicit_empty_body_keeps_its_framing() {
    let upstream = common::start_echo_backend().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    let res = client
        .post(gw.url("/anything"))
        .header(reqwest::header::CONTENT_LENGTH, "0")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let data: Value = res.json().await.unwrap();
    assert_eq!(data["data"], "");
    assert_eq!(data["headers"]["content-length"], "0");

    gw.shutdown.trigger();
}

#[tokio::test]
async fn body_is_forwarded_verbatim() {
    let upstream = common::start_echo_backend().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    let res = client
        .post(gw.url("/anything"))
        .body("hello upstream")
        .send()
        .await
        .unwrap();
    let data: Value = res.json().await.unwrap();
    assert_eq!(data["data"], "hello upstream");

    gw.shutdown.trigger();
}

#[tokio::test]
async fn status_reflects_completed_requests() {
    let upstream = common::start_echo_backend().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    let before = status(&client, &gw).await;
    assert_eq!(before["request_count"], 0);

    let res = client.post(gw.url("/anything?a=1&b=2")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let after = status(&client, &gw).await;
    assert_eq!(after["request_count"], 1);
    assert!(after["uptime"].as_f64().unwrap() > 0.0);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn request_count_matches_successive_posts() {
    let upstream = common::start_echo_backend().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    for _ in 0..7 {
        let res = client.post(gw.url("/x")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    assert_eq!(status(&client, &gw).await["request_count"], 7);
    // Reading status does not count as a proxied request.
    assert_eq!(status(&client, &gw).await["request_count"], 7);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn uptime_never_decreases() {
    let upstream = common::start_echo_backend().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    let mut last = 0.0;
    for _ in 0..5 {
        let uptime = status(&client, &gw).await["uptime"].as_f64().unwrap();
        assert!(uptime >= last);
        last = uptime;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    gw.shutdown.trigger();
}

#[tokio::test]
async fn every_request_gets_a_fresh_token_id() {
    let upstream = common::start_echo_backend().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();
    let issuer = TokenIssuer::default();

    let mut ids = HashSet::new();
    for _ in 0..20 {
        let data: Value = client
            .post(gw.url("/anything"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let token = data["headers"]["x-my-jwt"].as_str().unwrap();
        assert!(ids.insert(issuer.verify(token).unwrap().jti));
    }
    assert_eq!(ids.len(), 20);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn upstream_response_is_relayed_unchanged() {
    let upstream =
        common::start_fixed_backend(StatusCode::IM_A_TEAPOT, "text/plain; charset=utf-8", "teapot")
            .await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    let res = client.post(gw.url("/brew")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(
        res.headers()[reqwest::header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(res.text().await.unwrap(), "teapot");

    // Any answer from upstream, error statuses included, is a completed request.
    assert_eq!(gw.stats.request_count(), 1);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn unreachable_upstream_is_a_server_error_and_not_counted() {
    let upstream = common::closed_port().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    let res = client.post(gw.url("/anything")).send().await.unwrap();
    assert!(res.status().is_server_error());
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    assert_eq!(status(&client, &gw).await["request_count"], 0);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn post_to_status_is_proxied() {
    let upstream = common::start_echo_backend().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    let res = client.post(gw.url("/status")).send().await.unwrap();
    let data: Value = res.json().await.unwrap();
    assert_eq!(data["path"], "/post");
    assert_eq!(gw.stats.request_count(), 1);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn unsupported_methods_use_router_defaults() {
    let upstream = common::start_echo_backend().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    let res = client.get(gw.url("/anything")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    let res = client.delete(gw.url("/status")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    assert_eq!(gw.stats.request_count(), 0);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn shutdown_closes_upstream_session() {
    let upstream = common::start_echo_backend().await;
    let gw = common::start_gateway(upstream).await;
    let client = common::client();

    let res = client.post(gw.url("/anything")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    drop(client);

    gw.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), gw.handle)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();

    assert!(gw.upstream.is_closed());
    assert_eq!(gw.stats.request_count(), 1);
}
