//! Health endpoint and server-level behavior.

use http::StatusCode;

use crate::common::{TestHarness, access_token, refresh_token, test_settings};

#[tokio::test]
async fn test_health_in_memory() {
    let h = TestHarness::new();
    let resp = h.get("/health", None).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], "healthy");
    assert_eq!(resp.body["service"], "RideMatch Auth Service");
    assert_eq!(resp.body["version"], "1.0.0");
    assert_eq!(resp.body["dependencies"]["database"], "ok");
    assert_eq!(resp.body["dependencies"]["redis"], "ok");
}

#[tokio::test]
async fn test_health_degraded_when_token_store_down() {
    let h = TestHarness::with_token_store_down();
    let resp = h.get("/health", None).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], "degraded");
    assert_eq!(resp.body["dependencies"]["database"], "ok");
    assert_eq!(resp.body["dependencies"]["redis"], "error");
}

#[tokio::test]
async fn test_service_usable_when_token_store_down() {
    let h = TestHarness::with_token_store_down();
    let body = h.register("dana@example.com", "Dana").await;
    let access = access_token(&body);

    let resp = h
        .post(
            "/api/auth/logout",
            serde_json::json!({"refresh_token": refresh_token(&body)}),
            Some(&access),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Successfully logged out");

    let resp = h
        .post("/api/auth/logout/all", serde_json::json!({}), Some(&access))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["revoked"], 0);

    let resp = h
        .post(
            "/api/auth/refresh",
            serde_json::json!({"refresh_token": refresh_token(&body)}),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["detail"], "Refresh token has been revoked");
}

#[tokio::test]
async fn test_custom_api_prefix() {
    let settings = ridematch_core::Settings {
        api_prefix: "/v2/auth/".to_string(),
        ..test_settings()
    };
    let h = TestHarness::with_settings(settings);

    let resp = h
        .post(
            "/v2/auth/login",
            serde_json::json!({"email": "x@example.com", "password": "whatever1"}),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = h.get("/api/auth/login", None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route() {
    let h = TestHarness::new();
    let resp = h.get("/nope", None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
