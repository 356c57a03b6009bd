//! Live HTTP API tests.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The server running (cargo run -p salto-server)
//! - `ADMIN_PASSWORD` exported to match the server's configuration
//!
//! Run with: cargo test -p salto-server --test api -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
fn base_url() -> String {
    std::env::var("SALTO_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// A client that keeps its session cookie across requests.
fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

#[tokio::test]
#[ignore = "Requires a running server"]
async fn health_endpoints_respond() {
    let client = session_client();
    let base = base_url();

    let resp = client
        .get(format!("{base}/health"))
        .send()
        .await
        .expect("health request");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base}/health/ready"))
        .send()
        .await
        .expect("readiness request");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires a running server"]
async fn chat_round_trip() {
    let client = session_client();
    let base = base_url();

    // Create a session
    let created: Value = client
        .post(format!("{base}/chat/create"))
        .send()
        .await
        .expect("create request")
        .json()
        .await
        .expect("create body");
    let chat_id = created
        .get("id")
        .and_then(Value::as_str)
        .expect("assigned id")
        .to_string();

    // Send a message; the reply is an assistant message
    let reply: Value = client
        .post(format!("{base}/chat/{chat_id}/send"))
        .json(&json!({ "message": "Hello" }))
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("send body");
    assert_eq!(reply.get("role").and_then(Value::as_str), Some("assistant"));

    // Both turns are listed
    let messages: Value = client
        .get(format!("{base}/chat/{chat_id}/messages"))
        .send()
        .await
        .expect("messages request")
        .json()
        .await
        .expect("messages body");
    assert_eq!(messages.as_array().map(Vec::len), Some(2));

    // Clean up
    let resp = client
        .delete(format!("{base}/chat/{chat_id}"))
        .send()
        .await
        .expect("delete request");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires a running server"]
async fn malformed_ids_are_rejected() {
    let client = session_client();
    let base = base_url();

    let resp = client
        .get(format!("{base}/chat/not-a-valid-id/messages"))
        .send()
        .await
        .expect("messages request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires a running server and ADMIN_PASSWORD"]
async fn admin_gate_requires_login() {
    let client = session_client();
    let base = base_url();

    let resp = client
        .post(format!("{base}/admin/clear-data"))
        .send()
        .await
        .expect("clear request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let password = std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD for login");
    let resp = client
        .post(format!("{base}/admin/login"))
        .json(&json!({ "password": password }))
        .send()
        .await
        .expect("login request");
    assert_eq!(resp.status(), StatusCode::OK);

    let settings: Value = client
        .get(format!("{base}/admin/settings"))
        .send()
        .await
        .expect("settings request")
        .json()
        .await
        .expect("settings body");
    assert!(settings.get("instance_name").is_some());
}
