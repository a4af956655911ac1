//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use axum::body::Body;
use http::Request;
use tower::ServiceExt;
use wiremock::MockServer;

use sealradio::config::{ApiKey, Config, LoggingConfig, ServerConfig, UpstreamConfig};
use sealradio::proxy::{create_router, AppState};

/// Credential configured for every test app. Must never show up in a response.
pub const TEST_API_KEY: &str = "test-key-AIzaSySecret";

/// Build a sealradio app whose upstream is `base_url`.
pub fn app_for(base_url: String) -> axum::Router {
    let config = Config {
        server: ServerConfig::default(),
        upstream: UpstreamConfig {
            base_url,
            api_key: Some(ApiKey::from(TEST_API_KEY)),
            timeout_secs: 5,
        },
        logging: LoggingConfig::default(),
    };
    let state = AppState::from_config(&config).expect("build app state");
    create_router(state)
}

/// Build a sealradio app pointed at a wiremock server's `/v1beta`.
pub fn app_with_mock(server: &MockServer) -> axum::Router {
    app_for(format!("{}/v1beta", server.uri()))
}

/// Send one request through the app and return status, headers and body text.
pub async fn send(
    app: axum::Router,
    request: Request<Body>,
) -> (http::StatusCode, http::HeaderMap, String) {
    let response = app.oneshot(request).await.expect("router response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
        .await
        .expect("read body");
    (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse a response body as JSON, panicking with the body on failure.
pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("invalid JSON body {:?}: {}", body, e))
}

/// Build a JSON POST request.
pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
