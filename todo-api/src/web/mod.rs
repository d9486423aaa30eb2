/// Server-rendered web frontend
///
/// The token travels in the HTTP-only `access_token` cookie. Pages that need
/// a signed-in user take a [`WebUser`]; anonymous callers are sent to the
/// login page with a `302 Found`.
///
/// - `pages`: template rendering
/// - `auth`: login, logout and registration pages
/// - `todos`: todo list and forms

pub mod auth;
pub mod pages;
pub mod todos;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use todo_shared::auth::{
    jwt::Identity,
    middleware::{identity_from_cookie, ACCESS_TOKEN_COOKIE},
};

use crate::app::AppState;

/// `302 Found` to `location`
///
/// Axum's `Redirect::to` answers `303`; the web pages use `302`.
pub fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Cookie that clears the session token
///
/// Added to the jar rather than removed from it, so the expired cookie is
/// sent even when the request carried none.
pub(crate) fn expired_token_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(ACCESS_TOKEN_COOKIE).path("/").build();
    cookie.make_removal();
    cookie
}

/// Signed-in user of a web page
#[derive(Debug, Clone)]
pub struct WebUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for WebUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        match identity_from_cookie(&jar, state.jwt_secret()) {
            Some(identity) => Ok(WebUser(identity)),
            None if jar.get(ACCESS_TOKEN_COOKIE).is_some() => {
                Err((jar.add(expired_token_cookie()), found("/auth")).into_response())
            }
            None => Err(found("/auth")),
        }
    }
}
