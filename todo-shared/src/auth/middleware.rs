/// Credential extraction for Axum requests
///
/// Two carriers are supported:
///
/// - **Bearer**: `Authorization: Bearer <token>` (JSON API)
/// - **Cookie**: `access_token=<token>` set by the web login (HTTP-only)
///
/// Bearer resolution is strict and reports why it failed. Cookie resolution is
/// lenient: any problem means the caller is treated as anonymous.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use chrono::Duration;
/// use todo_shared::auth::{jwt, middleware::authenticate_bearer};
///
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let token = jwt::issue_token("alice", 1, None, Duration::minutes(5), secret).unwrap();
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     header::AUTHORIZATION,
///     HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
/// );
///
/// let identity = authenticate_bearer(&headers, secret).unwrap();
/// assert_eq!(identity.username, "alice");
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use super::jwt::{resolve_token, Identity, JwtError};

/// Name of the cookie carrying the web session token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Error type for credential extraction
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credential was presented
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header present but not a bearer credential
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token failed validation
    #[error(transparent)]
    Token(#[from] JwtError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, "Could not validate user.").into_response()
    }
}

/// Extracts the raw bearer token from the `Authorization` header
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Header is not valid ASCII".to_string()))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidFormat("Expected Bearer token".to_string()));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    Ok(token)
}

/// Resolves the caller's identity from a bearer token
///
/// # Errors
///
/// - `AuthError::MissingCredentials` if no token was sent
/// - `AuthError::InvalidFormat` if the header is not a bearer credential
/// - `AuthError::Token` if the token does not resolve
pub fn authenticate_bearer(headers: &HeaderMap, secret: &str) -> Result<Identity, AuthError> {
    let token = bearer_token(headers)?;
    Ok(resolve_token(token, secret)?)
}

/// Resolves the caller's identity from the access token cookie
///
/// Returns `None` for a missing cookie as well as for an invalid, expired or
/// incomplete token.
pub fn identity_from_cookie(jar: &CookieJar, secret: &str) -> Option<Identity> {
    let cookie = jar.get(ACCESS_TOKEN_COOKIE)?;

    match resolve_token(cookie.value(), secret) {
        Ok(identity) => Some(identity),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unusable access token cookie");
            None
        }
    }
}
