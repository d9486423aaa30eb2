/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todo_api::{app::{build_router, AppState}, config::Config};
/// use todo_shared::db::{pool::{create_pool, DatabaseConfig}, postgres::PgStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config)?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::{Config, Surface},
    error::ApiError,
    middleware::security::SecurityHeadersLayer,
    web::pages::Pages,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use todo_shared::{auth::middleware::authenticate_bearer, db::store::Store};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Compiled page templates
    pub pages: Arc<Pages>,
}

impl AppState {
    /// Creates new application state
    ///
    /// # Errors
    ///
    /// Fails if an embedded template does not compile.
    pub fn new(store: Arc<dyn Store>, config: Config) -> Result<Self, tera::Error> {
        Ok(Self {
            store,
            config: Arc::new(config),
            pages: Arc::new(Pages::new()?),
        })
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router for the configured surface
///
/// ```text
/// /health                             both surfaces
///
/// APP_SURFACE=api
/// ├── POST   /auth/                   register
/// ├── POST   /auth/token              login (form), returns bearer token
/// ├── GET    /user/get_user           bearer
/// ├── PATCH  /user/change_password    bearer
/// ├── PATCH  /user/change_phone-number bearer
/// ├── GET    /todos/                  bearer
/// ├── POST   /todos/todo              bearer
/// ├── GET    /todos/todo/:id          bearer
/// ├── PUT    /todos/todo/:id          bearer
/// ├── DELETE /todos/todo/:id          bearer
/// └── PATCH  /todos/todo/:id/complete bearer
///
/// APP_SURFACE=web
/// ├── GET|POST /auth                  login page / login
/// ├── GET      /auth/logout
/// ├── GET|POST /auth/register
/// ├── GET      /todos                 cookie
/// ├── GET|POST /todos/add-todo        cookie
/// ├── GET|POST /todos/edit-todo/:id   cookie
/// ├── GET      /todos/delete/:id      cookie
/// └── GET      /todos/complete/:id    cookie
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http `TraceLayer`)
/// 2. CORS
/// 3. Security headers
/// 4. Bearer authentication (API user and todo routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let surface_routes = match state.config.api.surface {
        Surface::Api => api_routes(&state),
        Surface::Web => web_routes(),
    };

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(health_routes)
        .merge(surface_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    use crate::routes;

    let auth_routes = Router::new()
        .route("/auth/", post(routes::auth::register))
        .route("/auth/token", post(routes::auth::login));

    let protected_routes = Router::new()
        .route("/user/get_user", get(routes::users::get_user))
        .route("/user/change_password", patch(routes::users::change_password))
        .route(
            "/user/change_phone-number",
            patch(routes::users::change_phone_number),
        )
        .route("/todos/", get(routes::todos::list_todos))
        .route("/todos/todo", post(routes::todos::create_todo))
        .route(
            "/todos/todo/:id",
            get(routes::todos::get_todo)
                .put(routes::todos::update_todo)
                .delete(routes::todos::delete_todo),
        )
        .route(
            "/todos/todo/:id/complete",
            patch(routes::todos::toggle_complete),
        )
        // route_layer, so unknown paths stay 404 instead of 401
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    auth_routes.merge(protected_routes)
}

fn web_routes() -> Router<AppState> {
    use crate::web;

    Router::new()
        .route("/auth", get(web::auth::login_page).post(web::auth::login))
        .route("/auth/", get(web::auth::login_page).post(web::auth::login))
        .route("/auth/logout", get(web::auth::logout))
        .route(
            "/auth/register",
            get(web::auth::register_page).post(web::auth::register),
        )
        .route("/todos", get(web::todos::home))
        .route("/todos/", get(web::todos::home))
        .route(
            "/todos/add-todo",
            get(web::todos::add_todo_page).post(web::todos::add_todo),
        )
        .route(
            "/todos/edit-todo/:id",
            get(web::todos::edit_todo_page).post(web::todos::edit_todo),
        )
        .route("/todos/delete/:id", get(web::todos::delete_todo))
        .route("/todos/complete/:id", get(web::todos::complete_todo))
}

/// JWT authentication middleware layer
///
/// Resolves the bearer token into an [`Identity`](todo_shared::auth::jwt::Identity)
/// and injects it into request extensions. Runs before any session is opened.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = authenticate_bearer(req.headers(), state.jwt_secret())?;

    tracing::debug!(user_id = identity.id, "Authenticated bearer token");
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
