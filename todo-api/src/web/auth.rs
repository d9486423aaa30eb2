/// Web login, logout and registration
///
/// - `GET  /auth` - login page
/// - `POST /auth` - form login, sets the `access_token` cookie
/// - `GET  /auth/logout` - clears the cookie
/// - `GET  /auth/register` - registration page
/// - `POST /auth/register` - form registration

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use todo_shared::{
    auth::{jwt, middleware::ACCESS_TOKEN_COOKIE, password},
    models::NewUser,
};
use validator::Validate;

use super::{expired_token_cookie, found};
use crate::{
    app::AppState,
    error::ApiResult,
    routes::auth::{authenticate_user, DEFAULT_ROLE},
    session::DbSession,
};

const LOGIN_FAILED: &str = "Incorrect Username or password";
const LOGGED_OUT: &str = "Logout Successful";
const REGISTRATION_INVALID: &str = "Invalid registration request";
const REGISTERED: &str = "User successfully created";

/// Login form; the username field is named `email` on the page
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(rename = "email", alias = "username")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 100))]
    pub username: String,

    #[validate(length(min = 1, max = 100))]
    pub firstname: String,

    #[validate(length(min = 1, max = 100))]
    pub lastname: String,

    #[validate(length(min = 6))]
    pub password: String,

    pub password2: String,
}

pub async fn login_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    Ok(Html(state.pages.login(None)?))
}

/// Signs the user in and redirects to `/todos`
///
/// A failed login re-renders the page with a generic message.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    mut db: DbSession,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let Some(user) = authenticate_user(&mut *db, &form.username, &form.password).await? else {
        return Ok(Html(state.pages.login(Some(LOGIN_FAILED))?).into_response());
    };
    db.commit().await?;

    let token = jwt::issue_token(
        &user.username,
        user.id,
        Some(&user.role),
        state.config.jwt.web_ttl(),
        state.jwt_secret(),
    )?;

    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(state.config.api.production);

    tracing::info!(user_id = user.id, "Web login");
    Ok((jar.add(cookie), found("/todos")).into_response())
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Response> {
    let page = Html(state.pages.login(Some(LOGGED_OUT))?);
    Ok((jar.add(expired_token_cookie()), page).into_response())
}

pub async fn register_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    Ok(Html(state.pages.register(None)?))
}

/// Creates an account from the registration form
///
/// Accepted when the form is well-formed, both passwords match, and neither
/// the username nor the email is taken. Success shows the login page.
pub async fn register(
    State(state): State<AppState>,
    mut db: DbSession,
    Form(form): Form<RegisterForm>,
) -> ApiResult<Html<String>> {
    let invalid = form.validate().is_err()
        || form.password != form.password2
        || db.user_by_username(&form.username).await?.is_some()
        || db.user_by_email(&form.email).await?.is_some();

    if invalid {
        tracing::debug!(username = %form.username, "Rejected web registration");
        return Ok(Html(state.pages.register(Some(REGISTRATION_INVALID))?));
    }

    let hashed_password = password::hash_password(&form.password)?;
    let user = db
        .create_user(NewUser {
            username: form.username,
            email: form.email,
            first_name: form.firstname,
            last_name: form.lastname,
            hashed_password,
            role: DEFAULT_ROLE.to_string(),
        })
        .await?;
    db.commit().await?;

    tracing::info!(user_id = user.id, "User registered from web form");
    Ok(Html(state.pages.login(Some(REGISTERED))?))
}
