//! Profile endpoints.

use http::StatusCode;
use serde_json::json;

use crate::common::{TestHarness, access_token};

#[tokio::test]
async fn test_get_me() {
    let h = TestHarness::new();
    let body = h.register("tal@example.com", "Tal").await;

    let resp = h.get("/api/users/me", Some(&access_token(&body))).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["email"], "tal@example.com");
    assert_eq!(resp.body["driver_rating"], serde_json::Value::Null);
    assert_eq!(resp.body["driver_rating_count"], 0);
}

#[tokio::test]
async fn test_get_me_without_token() {
    let h = TestHarness::new();
    let resp = h.get("/api/users/me", None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["detail"], "Not authenticated");
    assert_eq!(resp.headers["www-authenticate"], "Bearer");
}

#[tokio::test]
async fn test_get_me_with_garbage_token() {
    let h = TestHarness::new();
    let resp = h.get("/api/users/me", Some("garbage")).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn test_token_for_unknown_user() {
    let h = TestHarness::new();
    let body = h.register("tal@example.com", "Tal").await;
    let token = access_token(&body);

    // same secret, fresh store: the user id no longer resolves
    let other = TestHarness::new();
    let resp = other.get("/api/users/me", Some(&token)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn test_deactivated_user_forbidden() {
    let h = TestHarness::new();
    let body = h.register("tal@example.com", "Tal").await;
    let id = body["user"]["id"].as_i64().unwrap();
    h.users.set_active(id, false).unwrap();

    let resp = h.get("/api/users/me", Some(&access_token(&body))).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.body["detail"], "Account is deactivated");
}

#[tokio::test]
async fn test_update_me() {
    let h = TestHarness::new();
    let body = h.register("tal@example.com", "Tal").await;
    let token = access_token(&body);

    let resp = h
        .put(
            "/api/users/me",
            json!({
                "name": " Tal Cohen ",
                "gender": "Other",
                "preferences": {"default_mode": "driver", "language": "he"}
            }),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    assert_eq!(resp.body["name"], "Tal Cohen");
    assert_eq!(resp.body["gender"], "other");
    assert_eq!(resp.body["preferences"]["default_mode"], "driver");

    let me = h.get("/api/users/me", Some(&token)).await;
    assert_eq!(me.body["name"], "Tal Cohen");
}

#[tokio::test]
async fn test_update_me_rejects_bad_preferences() {
    let h = TestHarness::new();
    let body = h.register("tal@example.com", "Tal").await;

    let resp = h
        .put(
            "/api/users/me",
            json!({"preferences": {"theme": "neon"}}),
            Some(&access_token(&body)),
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.body["errors"][0]["field"], "preferences");
}

#[tokio::test]
async fn test_get_public_profile() {
    let h = TestHarness::new();
    let viewer = h.register("tal@example.com", "Tal").await;
    let other = h.register("gal@example.com", "Gal").await;
    let other_id = other["user"]["id"].as_i64().unwrap();

    let resp = h
        .get(
            &format!("/api/users/{other_id}"),
            Some(&access_token(&viewer)),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["name"], "Gal");
    assert!(resp.body.get("email").is_none());
}

#[tokio::test]
async fn test_get_public_profile_missing() {
    let h = TestHarness::new();
    let viewer = h.register("tal@example.com", "Tal").await;

    let resp = h
        .get("/api/users/999", Some(&access_token(&viewer)))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["detail"], "User not found");
}

#[tokio::test]
async fn test_get_public_profile_bad_id() {
    let h = TestHarness::new();
    let viewer = h.register("tal@example.com", "Tal").await;

    let resp = h
        .get("/api/users/abc", Some(&access_token(&viewer)))
        .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.body["errors"][0]["field"], "user_id");
}
