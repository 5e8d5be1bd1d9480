//! Registration, login, refresh, and logout flows.

use http::StatusCode;
use serde_json::json;

use crate::common::{PASSWORD, TestHarness, access_token, refresh_token};

#[tokio::test]
async fn test_register_returns_user_and_tokens() {
    let h = TestHarness::new();
    let body = h.register("Shira@Example.COM", "  Shira  ").await;

    assert_eq!(body["user"]["email"], "Shira@example.com");
    assert_eq!(body["user"]["name"], "Shira");
    assert_eq!(body["user"]["is_active"], true);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 900);
    assert!(body["user"].get("password_hash").is_none());
    assert_eq!(h.tokens.len(), 1);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let h = TestHarness::new();
    h.register("shira@example.com", "Shira").await;

    let resp = h
        .post(
            "/api/auth/register",
            json!({"email": "shira@example.com", "password": PASSWORD, "name": "Other"}),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body["detail"], "Email already registered");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let h = TestHarness::new();
    let resp = h
        .post(
            "/api/auth/register",
            json!({"email": "nope", "password": "short", "name": "A", "gender": "robot"}),
            None,
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.body["detail"], "Validation error");
    let fields: Vec<&str> = resp.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"gender"));
    assert!(h.users.is_empty());
}

#[tokio::test]
async fn test_register_malformed_json() {
    let h = TestHarness::new();
    let resp = h
        .post("/api/auth/register", json!({"email": "a@b.io"}), None)
        .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.body["errors"][0]["field"], "body");
}

#[tokio::test]
async fn test_login_success() {
    let h = TestHarness::new();
    h.register("shira@example.com", "Shira").await;

    let resp = h
        .post(
            "/api/auth/login",
            json!({"email": "shira@example.com", "password": PASSWORD}),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body["user"]["id"].is_i64());
    assert!(resp.body["access_token"].is_string());
    assert!(resp.body["refresh_token"].is_string());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let h = TestHarness::new();
    h.register("shira@example.com", "Shira").await;

    let resp = h
        .post(
            "/api/auth/login",
            json!({"email": "shira@example.com", "password": "Wrong1234"}),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["detail"], "Invalid email or password");
    assert_eq!(resp.headers["www-authenticate"], "Bearer");
}

#[tokio::test]
async fn test_login_deactivated_account() {
    let h = TestHarness::new();
    let body = h.register("shira@example.com", "Shira").await;
    let id = body["user"]["id"].as_i64().unwrap();
    h.users.set_active(id, false).unwrap();

    let resp = h
        .post(
            "/api/auth/login",
            json!({"email": "shira@example.com", "password": PASSWORD}),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["detail"], "Account is deactivated");
}

#[tokio::test]
async fn test_login_form() {
    let h = TestHarness::new();
    h.register("shira@example.com", "Shira").await;

    let resp = h
        .send_form(
            "/api/auth/login/form",
            &format!("username=shira%40example.com&password={PASSWORD}"),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["token_type"], "bearer");
    assert!(resp.body["refresh_token"].is_string());
    assert_eq!(resp.body["expires_in"], 900);
}

#[tokio::test]
async fn test_login_form_missing_field() {
    let h = TestHarness::new();
    let resp = h
        .send_form("/api/auth/login/form", "username=shira%40example.com")
        .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_refresh_issues_access_token_only() {
    let h = TestHarness::new();
    let body = h.register("shira@example.com", "Shira").await;

    let resp = h
        .post(
            "/api/auth/refresh",
            json!({"refresh_token": refresh_token(&body)}),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body["access_token"].is_string());
    assert!(resp.body["refresh_token"].is_null());

    // the new access token works
    let me = h
        .get("/api/users/me", Some(&access_token(&resp.body)))
        .await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let h = TestHarness::new();
    let body = h.register("shira@example.com", "Shira").await;

    let resp = h
        .post(
            "/api/auth/refresh",
            json!({"refresh_token": access_token(&body)}),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["detail"], "Invalid or expired refresh token");
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let h = TestHarness::new();
    let body = h.register("shira@example.com", "Shira").await;
    let access = access_token(&body);
    let refresh = refresh_token(&body);

    let resp = h
        .post(
            "/api/auth/logout",
            json!({"refresh_token": refresh}),
            Some(&access),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Successfully logged out");

    let resp = h
        .post("/api/auth/refresh", json!({"refresh_token": refresh}), None)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["detail"], "Refresh token has been revoked");
}

#[tokio::test]
async fn test_logout_requires_access_token() {
    let h = TestHarness::new();
    let body = h.register("shira@example.com", "Shira").await;

    let resp = h
        .post(
            "/api/auth/logout",
            json!({"refresh_token": refresh_token(&body)}),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["detail"], "Not authenticated");
}

#[tokio::test]
async fn test_logout_with_another_users_token() {
    let h = TestHarness::new();
    let a = h.register("a@example.com", "Alon").await;
    let b = h.register("b@example.com", "Bat").await;

    let resp = h
        .post(
            "/api/auth/logout",
            json!({"refresh_token": refresh_token(&b)}),
            Some(&access_token(&a)),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["detail"], "Invalid refresh token");
}

#[tokio::test]
async fn test_logout_all() {
    let h = TestHarness::new();
    let a = h.register("a@example.com", "Alon").await;
    h.register("b@example.com", "Bat").await;

    let resp = h
        .post("/api/auth/logout/all", json!({}), Some(&access_token(&a)))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["revoked"], 1);
    assert_eq!(h.tokens.len(), 1);

    let resp = h
        .post(
            "/api/auth/refresh",
            json!({"refresh_token": refresh_token(&a)}),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}
