/// Integration tests for registration, login and profile endpoints
///
/// Drives the JSON router in-process against the in-memory store.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::{
    assert_status, body_json, form_request, get, json_request, TestContext, PASSWORD, SECRET,
};
use serde_json::json;
use todo_shared::auth::jwt::{self, Claims};

fn registration(username: &str, email: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": email,
        "first_name": "Alice",
        "last_name": "Liddell",
        "password": PASSWORD,
        "role": "user"
    })
}

async fn login(ctx: &TestContext, username: &str, password: &str) -> axum::response::Response {
    let body = format!("username={}&password={}&grant_type=password", username, password);
    ctx.send(form_request("/auth/token", None, &body)).await
}

#[tokio::test]
async fn test_register_login_and_get_user() {
    let ctx = TestContext::api();

    let response = ctx
        .send(json_request(
            Method::POST,
            "/auth/",
            None,
            registration("alice", "alice@example.com"),
        ))
        .await;
    assert_status(&response, StatusCode::CREATED);

    let response = login(&ctx, "alice", PASSWORD).await;
    assert_status(&response, StatusCode::OK);
    let token_body = body_json(response).await;
    assert_eq!(token_body["token_type"], "bearer");
    let token = token_body["access_token"].as_str().unwrap().to_string();

    let response = ctx.send(get("/user/get_user", Some(&token))).await;
    assert_status(&response, StatusCode::OK);
    let user = body_json(response).await;
    assert_eq!(user["username"], "alice");
    assert_eq!(user["email"], "alice@example.com");
    assert_eq!(user["first_name"], "Alice");
    assert_eq!(user["last_name"], "Liddell");
    assert_eq!(user["is_active"], true);
    assert_eq!(user["role"], "user");
    assert!(user["phone_number"].is_null());
    assert!(user.get("hashed_password").is_none());
}

#[tokio::test]
async fn test_register_defaults_role_and_hashes_password() {
    let ctx = TestContext::api();

    let mut body = registration("bob", "bob@example.com");
    body.as_object_mut().unwrap().remove("role");
    let response = ctx.send(json_request(Method::POST, "/auth/", None, body)).await;
    assert_status(&response, StatusCode::CREATED);

    let stored = ctx.stored_user("bob").await.unwrap();
    assert_eq!(stored.role, "user");
    assert_ne!(stored.hashed_password, PASSWORD);
    assert!(stored.hashed_password.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_register_duplicate_email_is_forbidden() {
    let ctx = TestContext::api();

    let first = ctx
        .send(json_request(
            Method::POST,
            "/auth/",
            None,
            registration("alice", "alice@example.com"),
        ))
        .await;
    assert_status(&first, StatusCode::CREATED);

    let second = ctx
        .send(json_request(
            Method::POST,
            "/auth/",
            None,
            registration("alice", "alice@example.com"),
        ))
        .await;
    assert_status(&second, StatusCode::FORBIDDEN);
    assert_eq!(body_json(second).await["message"], "email already exists");
}

#[tokio::test]
async fn test_register_duplicate_username_is_forbidden() {
    let ctx = TestContext::api();
    ctx.seed_user("alice").await;

    let response = ctx
        .send(json_request(
            Method::POST,
            "/auth/",
            None,
            registration("alice", "someone-else@example.com"),
        ))
        .await;
    assert_status(&response, StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], "username is taken");
}

#[tokio::test]
async fn test_register_validation_error() {
    let ctx = TestContext::api();

    let mut body = registration("alice", "not-an-email");
    body["password"] = json!("123");
    let response = ctx.send(json_request(Method::POST, "/auth/", None, body)).await;
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "password"]);
    assert!(ctx.stored_user("alice").await.is_none());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::api();
    ctx.seed_user("alice").await;

    let wrong_password = login(&ctx, "alice", "not-the-password").await;
    let unknown_user = login(&ctx, "mallory", PASSWORD).await;

    assert_status(&wrong_password, StatusCode::UNAUTHORIZED);
    assert_status(&unknown_user, StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_password).await, body_json(unknown_user).await);
}

#[tokio::test]
async fn test_issued_token_resolves_to_user() {
    let ctx = TestContext::api();
    let alice = ctx.seed_user("alice").await;

    let response = login(&ctx, "alice", PASSWORD).await;
    let token = body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let identity = jwt::resolve_token(&token, SECRET).unwrap();
    assert_eq!(identity.username, "alice");
    assert_eq!(identity.id, alice.id);
    assert_eq!(identity.role.as_deref(), Some("user"));

    let claims = jwt::decode_claims(&token, SECRET).unwrap();
    let ttl = claims.exp.unwrap() - claims.iat.unwrap();
    assert_eq!(ttl, 30 * 60);
}

#[tokio::test]
async fn test_protected_routes_reject_bad_credentials() {
    let ctx = TestContext::api();
    let alice = ctx.seed_user("alice").await;

    let expired = jwt::create_token(
        &Claims::issued_at(
            "alice",
            alice.id,
            None,
            Duration::minutes(30),
            Utc::now() - Duration::hours(1),
        ),
        SECRET,
    )
    .unwrap();
    let wrong_secret = jwt::issue_token(
        "alice",
        alice.id,
        None,
        Duration::minutes(30),
        "another-secret-that-is-long-enough",
    )
    .unwrap();

    for token in [expired.as_str(), wrong_secret.as_str(), "garbage"] {
        let response = ctx.send(get("/user/get_user", Some(token))).await;
        assert_status(&response, StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Could not validate user.");
    }

    let response = ctx.send(get("/user/get_user", None)).await;
    assert_status(&response, StatusCode::UNAUTHORIZED);

    let basic = Request::builder()
        .uri("/user/get_user")
        .header(header::AUTHORIZATION, "Basic YWxpY2U6cHc=")
        .body(Body::empty())
        .unwrap();
    assert_status(&ctx.send(basic).await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_without_id_claim_is_rejected() {
    let ctx = TestContext::api();

    let claims = Claims {
        sub: Some("alice".to_string()),
        id: None,
        role: None,
        iat: None,
        exp: Some((Utc::now() + Duration::minutes(5)).timestamp()),
    };
    let token = jwt::create_token(&claims, SECRET).unwrap();

    let response = ctx.send(get("/user/get_user", Some(&token))).await;
    assert_status(&response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_without_expiry_is_rejected() {
    let ctx = TestContext::api();
    let alice = ctx.seed_user("alice").await;

    let claims = Claims {
        sub: Some("alice".to_string()),
        id: Some(alice.id),
        role: None,
        iat: None,
        exp: None,
    };
    let token = jwt::create_token(&claims, SECRET).unwrap();

    let response = ctx.send(get("/user/get_user", Some(&token))).await;
    assert_status(&response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_user_for_missing_user_is_not_found() {
    let ctx = TestContext::api();

    let token = jwt::issue_token("ghost", 999, None, Duration::minutes(5), SECRET).unwrap();
    let response = ctx.send(get("/user/get_user", Some(&token))).await;

    assert_status(&response, StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "User not found");
}

#[tokio::test]
async fn test_change_password() {
    let ctx = TestContext::api();
    let alice = ctx.seed_user("alice").await;
    let token = ctx.token_for(&alice);

    let response = ctx
        .send(json_request(
            Method::PATCH,
            "/user/change_password",
            Some(&token),
            json!({ "password": "wrong-old", "new_password": "newpass1" }),
        ))
        .await;
    assert_status(&response, StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Old password is incorrect");

    let response = ctx
        .send(json_request(
            Method::PATCH,
            "/user/change_password",
            Some(&token),
            json!({ "password": PASSWORD, "new_password": "short" }),
        ))
        .await;
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);

    let response = ctx
        .send(json_request(
            Method::PATCH,
            "/user/change_password",
            Some(&token),
            json!({ "password": PASSWORD, "new_password": "newpass1" }),
        ))
        .await;
    assert_status(&response, StatusCode::NO_CONTENT);

    assert_status(&login(&ctx, "alice", PASSWORD).await, StatusCode::UNAUTHORIZED);
    assert_status(&login(&ctx, "alice", "newpass1").await, StatusCode::OK);
}

#[tokio::test]
async fn test_change_phone_number() {
    let ctx = TestContext::api();
    let alice = ctx.seed_user("alice").await;
    let bob = ctx.seed_user("bob").await;

    let response = ctx
        .send(json_request(
            Method::PATCH,
            "/user/change_phone-number",
            Some(&ctx.token_for(&alice)),
            json!({ "phone_number": "555-0100" }),
        ))
        .await;
    assert_status(&response, StatusCode::NO_CONTENT);
    assert_eq!(
        ctx.stored_user("alice").await.unwrap().phone_number.as_deref(),
        Some("555-0100")
    );

    // Same number for a second account violates the unique constraint
    let response = ctx
        .send(json_request(
            Method::PATCH,
            "/user/change_phone-number",
            Some(&ctx.token_for(&bob)),
            json!({ "phone_number": "555-0100" }),
        ))
        .await;
    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "internal_error");
    assert!(!body["message"].as_str().unwrap().contains("phone"));
    assert!(ctx.stored_user("bob").await.unwrap().phone_number.is_none());
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::api();

    let response = ctx.send(get("/health", None)).await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(response.headers().get("X-Frame-Options").unwrap(), "DENY");

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_web_routes_absent_on_api_surface() {
    let ctx = TestContext::api();

    let response = ctx.send(get("/todos/add-todo", None)).await;
    assert_status(&response, StatusCode::NOT_FOUND);
}
