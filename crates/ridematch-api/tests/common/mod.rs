//! Common test utilities and harness for API integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use ridematch_api::{AppState, app};
use ridematch_auth::{AuthError, MemoryTokenStore, RefreshTokenStore};
use ridematch_core::Settings;
use ridematch_storage::MemoryUserStore;

/// Password used by [`TestHarness::register`].
pub const PASSWORD: &str = "SecureP4ss";

/// A response with its body parsed as JSON (`Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    pub body: Value,
}

/// Test harness wrapping the app over in-memory stores.
pub struct TestHarness {
    pub app: Router,
    pub users: Arc<MemoryUserStore>,
    pub tokens: Arc<MemoryTokenStore>,
}

impl TestHarness {
    /// Harness with test-friendly settings (cheap bcrypt).
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    /// Harness with custom settings.
    pub fn with_settings(settings: Settings) -> Self {
        let tokens = Arc::new(MemoryTokenStore::new());
        Self::with_token_store(settings, tokens.clone(), tokens)
    }

    /// Harness whose app uses `store` for refresh tokens. `tokens` is kept
    /// for inspection only.
    pub fn with_token_store(
        settings: Settings,
        store: Arc<dyn RefreshTokenStore>,
        tokens: Arc<MemoryTokenStore>,
    ) -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let state = AppState::new(settings, users.clone(), store).unwrap();
        Self {
            app: app(state),
            users,
            tokens,
        }
    }

    /// Harness whose refresh-token backend is unreachable.
    pub fn with_token_store_down() -> Self {
        Self::with_token_store(
            test_settings(),
            Arc::new(DownTokenStore),
            Arc::new(MemoryTokenStore::new()),
        )
    }

    /// Send a request with an optional JSON body and bearer token.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    /// Send a url-encoded form.
    pub async fn send_form(&self, uri: &str, form: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.dispatch(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, None, token).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.send(Method::POST, uri, Some(body), token).await
    }

    pub async fn put(&self, uri: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.send(Method::PUT, uri, Some(body), token).await
    }

    /// Register a user and return the response body.
    pub async fn register(&self, email: &str, name: &str) -> Value {
        let resp = self
            .post(
                "/api/auth/register",
                json!({"email": email, "password": PASSWORD, "name": name}),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);
        resp.body
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Refresh-token store whose every call fails, like Redis when it is down.
pub struct DownTokenStore;

#[async_trait]
impl RefreshTokenStore for DownTokenStore {
    async fn store(&self, _: &str, _: i64, _: Duration) -> Result<(), AuthError> {
        Err(AuthError::token_store("connection refused"))
    }

    async fn is_valid(&self, _: &str) -> Result<bool, AuthError> {
        Err(AuthError::token_store("connection refused"))
    }

    async fn revoke(&self, _: &str) -> Result<bool, AuthError> {
        Err(AuthError::token_store("connection refused"))
    }

    async fn revoke_all_for_user(&self, _: i64) -> Result<u64, AuthError> {
        Err(AuthError::token_store("connection refused"))
    }

    async fn ping(&self) -> Result<(), AuthError> {
        Err(AuthError::token_store("connection refused"))
    }
}

/// Default settings with the minimum bcrypt cost.
pub fn test_settings() -> Settings {
    Settings {
        bcrypt_rounds: 4,
        jwt_secret_key: "integration-test-secret".to_string(),
        ..Settings::default()
    }
}

/// Access token from a register/login body.
pub fn access_token(body: &Value) -> String {
    body["access_token"].as_str().unwrap().to_string()
}

/// Refresh token from a register/login body.
pub fn refresh_token(body: &Value) -> String {
    body["refresh_token"].as_str().unwrap().to_string()
}
