//! Common test utilities for integration tests
//!
//! - In-memory store, so no database is needed
//! - Router built for either surface
//! - Request builders and body readers
//! - User seeding and token helpers

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use todo_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig, Surface},
};
use todo_shared::{
    auth::{jwt, password},
    db::{
        memory::MemoryStore,
        store::{Session, Store},
    },
    models::{NewTodo, NewUser, Todo, User},
};
use tower::Service as _;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const PASSWORD: &str = "pw123456";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: MemoryStore,
    pub app: Router,
    pub config: Config,
}

pub fn test_config(surface: Surface) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            surface,
            production: false,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "memory://".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: SECRET.to_string(),
            api_ttl_minutes: 30,
            web_ttl_minutes: 60,
        },
    }
}

impl TestContext {
    pub fn new(surface: Surface) -> Self {
        let store = MemoryStore::new();
        let config = test_config(surface);
        let state = AppState::new(Arc::new(store.clone()), config.clone()).unwrap();

        TestContext {
            store,
            app: build_router(state),
            config,
        }
    }

    pub fn api() -> Self {
        Self::new(Surface::Api)
    }

    pub fn web() -> Self {
        Self::new(Surface::Web)
    }

    /// Sends one request through the full middleware stack
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().call(request).await.unwrap()
    }

    /// Creates a user directly in the store
    pub async fn seed_user(&self, username: &str) -> User {
        let mut session = self.store.begin().await.unwrap();
        let user = session
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                first_name: username.to_string(),
                last_name: "Tester".to_string(),
                hashed_password: password::hash_password(PASSWORD).unwrap(),
                role: "user".to_string(),
            })
            .await
            .unwrap();
        session.commit().await.unwrap();
        user
    }

    /// Creates a todo directly in the store
    pub async fn seed_todo(&self, owner: &User, title: &str) -> Todo {
        let mut session = self.store.begin().await.unwrap();
        let todo = session
            .create_todo(NewTodo {
                title: title.to_string(),
                description: "seeded for a test".to_string(),
                priority: 2,
                complete: false,
                owner_id: owner.id,
            })
            .await
            .unwrap();
        session.commit().await.unwrap();
        todo
    }

    pub async fn stored_todo(&self, todo_id: i64, owner_id: i64) -> Option<Todo> {
        let mut session = self.store.begin().await.unwrap();
        session.todo_for_owner(todo_id, owner_id).await.unwrap()
    }

    pub async fn stored_user(&self, username: &str) -> Option<User> {
        let mut session = self.store.begin().await.unwrap();
        session.user_by_username(username).await.unwrap()
    }

    /// Token as the API login would issue it
    pub fn token_for(&self, user: &User) -> String {
        jwt::issue_token(
            &user.username,
            user.id,
            Some(&user.role),
            self.config.jwt.api_ttl(),
            SECRET,
        )
        .unwrap()
    }

    /// Cookie header value carrying a valid web token
    pub fn cookie_for(&self, user: &User) -> String {
        format!("access_token={}", self.token_for(user))
    }
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn form_request(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    builder.body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Raw value of the first `Set-Cookie` header
pub fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status");
}
