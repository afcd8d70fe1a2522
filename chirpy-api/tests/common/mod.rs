/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - An in-memory store and dev-mode configuration
/// - Cheap password hashing parameters
/// - Request helpers that drive the router without a socket

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chirpy_api::app::{build_router, AppState};
use chirpy_api::config::Config;
use chirpy_shared::store::{MemoryStore, Store};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::Service as _;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<dyn Store>,
    pub app: Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a dev-mode context with a fresh in-memory store
    pub fn new() -> Self {
        Self::with_platform("dev")
    }

    /// Creates a context for the given `PLATFORM` value
    pub fn with_platform(platform: &str) -> Self {
        let vars: HashMap<&str, String> = HashMap::from([
            ("STORAGE_BACKEND", "memory".to_string()),
            ("JWT_SECRET", JWT_SECRET.to_string()),
            ("PLATFORM", platform.to_string()),
            ("POLKA_KEY", POLKA_KEY.to_string()),
            ("FILESERVER_ROOT", env!("CARGO_MANIFEST_DIR").to_string()),
            ("PASSWORD_HASH_MEMORY_KIB", "8".to_string()),
            ("PASSWORD_HASH_ITERATIONS", "1".to_string()),
            ("PASSWORD_HASH_PARALLELISM", "1".to_string()),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let app = build_router(AppState::new(store.clone(), config.clone()));

        TestContext { store, app, config }
    }

    /// Sends a request and returns status plus parsed JSON body (`Null` if empty)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.send_raw(request).await;
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).unwrap_or(Value::String(body))
        };
        (status, json)
    }

    /// Sends a request and returns status plus body text
    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    /// Registers an account and returns its JSON
    pub async fn register(&self, email: &str, password: &str) -> Value {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/api/users",
                None,
                json!({ "email": email, "password": password }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body
    }

    /// Logs in and returns the login response JSON
    pub async fn login(&self, email: &str, password: &str) -> Value {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/api/login",
                None,
                json!({ "email": email, "password": password }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body
    }

    /// Registers then logs in, returning the login response JSON
    pub async fn signup(&self, email: &str, password: &str) -> Value {
        self.register(email, password).await;
        self.login(email, password).await
    }
}

/// Builds a JSON request with an optional `Authorization` value
pub fn json_request(method: &str, uri: &str, authorization: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Builds a body-less request with an optional `Authorization` value
pub fn empty_request(method: &str, uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

/// `Bearer <token>` header value
pub fn bearer(token: &Value) -> String {
    format!("Bearer {}", token.as_str().unwrap())
}
