use axum::body::Body;
use axum::http::{Request, Response};
use routine_builder::config::RelayConfig;
use routine_builder::relay::{router, RelayState};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

#[allow(dead_code)]
pub const TEST_API_KEY: &str = "sk-test-relay-key";

/// Relay configuration pointing at `upstream_url` with a test credential
#[allow(dead_code)]
pub fn relay_config(upstream_url: &str) -> RelayConfig {
    RelayConfig {
        upstream_url: upstream_url.to_string(),
        api_key: Some(TEST_API_KEY.to_string()),
        ..RelayConfig::default()
    }
}

/// Relay router forwarding to `upstream_url`
#[allow(dead_code)]
pub fn relay_app(upstream_url: &str) -> axum::Router {
    let state = RelayState::new(relay_config(upstream_url)).expect("relay state");
    router(Arc::new(state))
}

/// POST request with a JSON body
#[allow(dead_code)]
pub fn post_json(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Collect a response body as bytes
#[allow(dead_code)]
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

/// Collect a response body as JSON
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body is JSON")
}

/// Upstream chat-completion body with a single assistant message
#[allow(dead_code)]
pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
    })
}

#[allow(dead_code)]
pub fn temp_catalog_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let catalog_path = temp_dir.path().join("products.json");
    fs::write(&catalog_path, contents).expect("failed to write catalog file");
    (temp_dir, catalog_path)
}
