/// Authentication endpoints
///
/// - `POST /auth/` - Register new user
/// - `POST /auth/token` - Exchange username/password for a bearer token
///
/// Login failures are reported identically whether the username is unknown
/// or the password is wrong.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    session::DbSession,
};
use axum::{extract::State, http::StatusCode, Form, Json};
use serde::{Deserialize, Serialize};
use todo_shared::{
    auth::{jwt, password},
    db::store::Session,
    models::{NewUser, User},
};
use validator::Validate;

/// Role given to users that do not ask for one
pub const DEFAULT_ROLE: &str = "user";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Defaults to `user`
    #[validate(length(min = 1, max = 50, message = "Role must be 1-50 characters"))]
    pub role: Option<String>,
}

/// OAuth2 password-grant form
///
/// Other OAuth2 fields (`grant_type`, `scope`, ...) are accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Always `bearer`
    pub token_type: String,
}

/// Looks up `username` and checks `password` against its stored hash
///
/// Returns `None` for an unknown user and for a wrong password alike.
pub async fn authenticate_user(
    session: &mut dyn Session,
    username: &str,
    password: &str,
) -> ApiResult<Option<User>> {
    let Some(user) = session.user_by_username(username).await? else {
        tracing::debug!(username, "Login failed: unknown username");
        return Ok(None);
    };

    if !password::verify_password(password, &user.hashed_password)? {
        tracing::debug!(username, "Login failed: wrong password");
        return Ok(None);
    }

    Ok(Some(user))
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "first_name": "Alice",
///   "last_name": "Liddell",
///   "password": "pw123456",
///   "role": "user"
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: email already exists / username is taken
/// - `422 Unprocessable Entity`: validation failed
pub async fn register(
    mut db: DbSession,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    if db.user_by_email(&req.email).await?.is_some() {
        return Err(ApiError::Forbidden("email already exists".to_string()));
    }

    if db.user_by_username(&req.username).await?.is_some() {
        return Err(ApiError::Forbidden("username is taken".to_string()));
    }

    let hashed_password = password::hash_password(&req.password)?;

    let user = db
        .create_user(NewUser {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            hashed_password,
            role: req.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        })
        .await?;
    db.commit().await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok(StatusCode::CREATED)
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/token
/// Content-Type: application/x-www-form-urlencoded
///
/// username=alice&password=pw123456
/// ```
///
/// # Response
///
/// ```json
/// { "access_token": "eyJ...", "token_type": "bearer" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: "Could not validate user."
pub async fn login(
    State(state): State<AppState>,
    mut db: DbSession,
    Form(req): Form<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = authenticate_user(&mut *db, &req.username, &req.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Could not validate user.".to_string()))?;
    db.commit().await?;

    let access_token = jwt::issue_token(
        &user.username,
        user.id,
        Some(&user.role),
        state.config.jwt.api_ttl(),
        state.jwt_secret(),
    )?;

    tracing::info!(user_id = user.id, "Issued access token");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
