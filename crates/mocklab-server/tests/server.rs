//! Integration tests for the mock and admin listeners.
//!
//! Each test builds a fixture tree in a temp directory, starts the server
//! in-process on ephemeral ports and drives it over HTTP.

use assert_json_diff::assert_json_eq;
use mocklab_server::{Config, Mocklab, RunningMocklab};
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

struct TestServer {
    tmp: TempDir,
    running: RunningMocklab,
    client: Client,
}

impl TestServer {
    async fn start(fixtures: &[(&str, &str)], overlay: Option<&str>) -> Self {
        let tmp = TempDir::new().unwrap();
        for (rel, body) in fixtures {
            write(tmp.path(), rel, body);
        }

        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            admin_port: Some(0),
            overlay: overlay.map(str::to_string),
            mocks_dir: tmp.path().join("mocks"),
            overlays_dir: tmp.path().join("overlays"),
            history_limit: 10,
        };
        let running = Mocklab::new(config).unwrap().start().await.unwrap();

        Self {
            tmp,
            running,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.running.mock_addr(), path)
    }

    fn admin_url(&self, path: &str) -> String {
        format!("http://{}{}", self.running.admin_addr().unwrap(), path)
    }
}

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

#[tokio::test]
async fn test_serves_index_fixture() {
    let server = TestServer::start(&[("mocks/users/index.json", r#"{"ok": true}"#)], None).await;

    let response = server.client.get(server.url("/users")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    assert_eq!(
        response.headers()["x-mocklab-fixture"].to_str().unwrap(),
        "/mocks/users/index.json"
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_json_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn test_query_fixture_status() {
    let server = TestServer::start(
        &[("mocks/users/[id=5]-status-404.json", r#"{"error":"no user"}"#)],
        None,
    )
    .await;

    let response = server
        .client
        .get(server.url("/users?id=5"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_json_eq!(body, json!({"error": "no user"}));
}

#[tokio::test]
async fn test_delay_and_status() {
    let server = TestServer::start(
        &[("mocks/ping-delay-250-status-201.json", r#"{"pong":true}"#)],
        None,
    )
    .await;

    let started = Instant::now();
    let response = server.client.get(server.url("/ping")).send().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(250));
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_json_eq!(body, json!({"pong": true}));
}

#[tokio::test]
async fn test_delayed_request_does_not_block_others() {
    let server = TestServer::start(
        &[
            ("mocks/slow-delay-1000.json", r#"{"speed":"slow"}"#),
            ("mocks/fast.json", r#"{"speed":"fast"}"#),
        ],
        None,
    )
    .await;

    let started = Instant::now();
    let slow = tokio::spawn({
        let client = server.client.clone();
        let url = server.url("/slow");
        async move {
            let response = client.get(url).send().await.unwrap();
            (response.status(), started.elapsed())
        }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let response = server.client.get(server.url("/fast")).send().await.unwrap();
    let fast_elapsed = started.elapsed();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!slow.is_finished());

    let (slow_status, slow_elapsed) = slow.await.unwrap();
    assert_eq!(slow_status, StatusCode::OK);
    assert!(slow_elapsed >= Duration::from_millis(1000));
    assert!(fast_elapsed < Duration::from_millis(800));
}

#[tokio::test]
async fn test_informational_status_is_served_as_200() {
    let server = TestServer::start(&[("mocks/hello-status-100.json", r#"{"hi":1}"#)], None).await;

    let response = server.client.get(server.url("/hello")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_json_eq!(body, json!({"hi": 1}));
}

#[tokio::test]
async fn test_not_found_body() {
    let server = TestServer::start(&[], None).await;

    let response = server
        .client
        .post(server.url("/orders?status=open"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_json_eq!(
        body,
        json!({
            "error": "Mock file not found",
            "path": "/orders",
            "query": {"status": "open"},
            "method": "POST"
        })
    );
}

#[tokio::test]
async fn test_malformed_fixture_is_500() {
    let server = TestServer::start(&[("mocks/broken.json", "{ not json")], None).await;

    let response = server.client.get(server.url("/broken")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Error reading mock file");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_unsupported_method_is_405() {
    let server = TestServer::start(&[("mocks/index.json", "{}")], None).await;

    let response = server
        .client
        .request(reqwest::Method::OPTIONS, server.url("/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_binary_fixture_is_sent_verbatim() {
    let server = TestServer::start(&[], None).await;
    let png = [0x89u8, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0xFF];
    fs::create_dir_all(server.tmp.path().join("mocks/img")).unwrap();
    fs::write(server.tmp.path().join("mocks/img/logo.png"), png).unwrap();

    let response = server
        .client
        .get(server.url("/img/logo.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "image/png"
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), &png);
}

#[tokio::test]
async fn test_overlay_switching_through_admin_api() {
    let server = TestServer::start(
        &[
            ("mocks/users/index.json", r#"{"source":"base"}"#),
            ("overlays/staging/users/index.json", r#"{"source":"staging"}"#),
        ],
        None,
    )
    .await;

    let body: serde_json::Value = server
        .client
        .get(server.url("/users"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["source"], "base");

    let response = server
        .client
        .put(server.admin_url("/overlay"))
        .json(&json!({"overlay": "staging"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_json_eq!(body, json!({"overlay": "staging", "previous": null}));

    let body: serde_json::Value = server
        .client
        .get(server.url("/users"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["source"], "staging");

    let response = server
        .client
        .put(server.admin_url("/overlay"))
        .json(&json!({"overlay": "../mocks"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = server
        .client
        .get(server.admin_url("/overlay"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_json_eq!(body, json!({"overlay": "staging"}));
}

#[tokio::test]
async fn test_configured_overlay_is_active_at_startup() {
    let server = TestServer::start(
        &[
            ("mocks/users/index.json", r#"{"source":"base"}"#),
            ("overlays/outage/[*].json", r#"{"source":"outage"}"#),
        ],
        Some("outage"),
    )
    .await;

    let response = server.client.get(server.url("/users")).send().await.unwrap();
    assert_eq!(
        response.headers()["x-mocklab-fixture"].to_str().unwrap(),
        "/overlays/outage/[*].json"
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["source"], "outage");
}

#[tokio::test]
async fn test_history_endpoint() {
    let server = TestServer::start(&[("mocks/a.json", "{}")], None).await;

    server.client.get(server.url("/a")).send().await.unwrap();
    server
        .client
        .delete(server.url("/b?x=1"))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = server
        .client
        .get(server.admin_url("/history"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["limit"], 10);
    let requests = body["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["uri"], "/b?x=1");
    assert_eq!(requests[0]["method"], "DELETE");
    assert_eq!(requests[0]["error"], true);
    assert!(requests[0]["filePath"].is_null());
    assert_eq!(requests[1]["uri"], "/a");
    assert_eq!(requests[1]["filePath"], "/mocks/a.json");
    assert_eq!(requests[1]["error"], false);

    let body: serde_json::Value = server
        .client
        .delete(server.admin_url("/history"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_json_eq!(body, json!({"cleared": 2}));
}

#[tokio::test]
async fn test_admin_health_config_and_metrics() {
    let server = TestServer::start(&[("mocks/a.json", "{}")], None).await;

    let body: serde_json::Value = server
        .client
        .get(server.admin_url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_json_eq!(body, json!({"status": "ok"}));

    let body: serde_json::Value = server
        .client
        .get(server.admin_url("/config"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["host"], "127.0.0.1");
    assert_eq!(body["historyLimit"], 10);

    server.client.get(server.url("/a")).send().await.unwrap();
    let text = server
        .client
        .get(server.admin_url("/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(text.contains("mocklab_requests_total"));

    let response = server
        .client
        .get(server.admin_url("/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
