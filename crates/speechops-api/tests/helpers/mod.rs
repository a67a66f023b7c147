//! Test helpers: build the router against mockito upstreams.
//!
//! Run from workspace root: `cargo test -p speechops-api`.

use axum_test::TestServer;
use serde_json::json;
use speechops_api::constants;
use speechops_api::setup::{routes, services};
use speechops_core::Config;

/// API path prefix for tests.
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus the two mocked upstreams.
pub struct TestApp {
    pub server: TestServer,
    pub speech_upstream: mockito::ServerGuard,
    pub table_upstream: mockito::ServerGuard,
}

fn test_config(speech_url: &str, table_url: &str) -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
        jwt_issuer: "speechops".to_string(),
        jwt_audience: "speechops-web".to_string(),
        jwt_expiry_days: 7,
        admin_username: "admin".to_string(),
        admin_password: "admin123".to_string(),
        speech_subscription_key: "test-key".to_string(),
        speech_endpoint: speech_url.to_string(),
        table_account_url: table_url.to_string(),
        table_sas_token: String::new(),
        http_timeout_secs: 5,
    }
}

pub async fn spawn_app() -> TestApp {
    let speech_upstream = mockito::Server::new_async().await;
    let table_upstream = mockito::Server::new_async().await;

    let config = test_config(&speech_upstream.url(), &table_upstream.url());
    let state = services::initialize_services(&config).expect("services");
    let router = routes::setup_routes(&config, state).expect("routes");

    TestApp {
        server: TestServer::new(router).expect("test server"),
        speech_upstream,
        table_upstream,
    }
}

/// Log in with the configured operator and return a bearer token.
pub async fn login(app: &TestApp) -> String {
    let response = app
        .server
        .post(&api_path("/auth/login"))
        .json(&json!({"username": "admin", "password": "admin123"}))
        .await;
    response.assert_status_ok();
    response.json::<serde_json::Value>()["token"]
        .as_str()
        .expect("token")
        .to_string()
}
