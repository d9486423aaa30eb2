/// Configuration management for the API server
///
/// Settings come from environment variables (optionally seeded from a `.env`
/// file) layered over built-in defaults, and are deserialized into a typed
/// [`Config`].
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8000)
/// - `APP_SURFACE`: `api` (JSON, default) or `web` (HTML pages)
/// - `APP_ENV`: `production` enables secure cookies and HSTS
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: HS256 signing secret, at least 32 characters (required)
/// - `JWT_API_TTL_MINUTES`: Bearer token lifetime (default: 30)
/// - `JWT_WEB_TTL_MINUTES`: Cookie token lifetime (default: 60)
/// - `RUST_LOG`: Log filter (default: todo_api=debug,todo_shared=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use todo_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use config::Environment;
use serde::{Deserialize, Serialize};

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,
}

/// Which set of routes the server exposes
///
/// Both surfaces own `/auth/` and `/todos/` paths, so one process serves one
/// of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// JSON API with bearer tokens
    #[default]
    Api,

    /// Server-rendered pages with a cookie token
    Web,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Exposed route set
    pub surface: Surface,

    /// Production mode: secure cookies and HSTS
    pub production: bool,

    /// Allowed CORS origins (`*` means any)
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be kept secret and be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Lifetime of tokens issued by `POST /auth/token`
    pub api_ttl_minutes: i64,

    /// Lifetime of the web login cookie token
    pub web_ttl_minutes: i64,
}

impl JwtConfig {
    pub fn api_ttl(&self) -> Duration {
        Duration::minutes(self.api_ttl_minutes)
    }

    pub fn web_ttl(&self) -> Duration {
        Duration::minutes(self.web_ttl_minutes)
    }
}

/// Flat view of the environment, one field per variable
#[derive(Debug, Deserialize)]
struct Settings {
    api_host: String,
    api_port: u16,
    app_surface: Surface,
    app_env: String,
    cors_origins: String,
    database_url: Option<String>,
    database_max_connections: u32,
    jwt_secret: Option<String>,
    jwt_api_ttl_minutes: i64,
    jwt_web_ttl_minutes: i64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// Reads `.env` first if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - A variable has an unparsable value
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::load(Environment::default())
    }

    /// Loads configuration from an explicit environment source
    ///
    /// Values stay strings until serde reads them into typed fields, so a
    /// digits-only secret or URL is kept verbatim.
    ///
    /// Tests pass `Environment::default().source(Some(map))` to avoid touching
    /// the process environment.
    pub fn load(env: Environment) -> anyhow::Result<Self> {
        let settings: Settings = config::Config::builder()
            .set_default("api_host", "0.0.0.0")?
            .set_default("api_port", 8000)?
            .set_default("app_surface", "api")?
            .set_default("app_env", "development")?
            .set_default("cors_origins", "*")?
            .set_default("database_max_connections", 10)?
            .set_default("jwt_api_ttl_minutes", 30)?
            .set_default("jwt_web_ttl_minutes", 60)?
            .add_source(env)
            .build()?
            .try_deserialize()?;

        let database_url = settings
            .database_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let jwt_secret = settings
            .jwt_secret
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }

        if settings.jwt_api_ttl_minutes <= 0 || settings.jwt_web_ttl_minutes <= 0 {
            anyhow::bail!("JWT token lifetimes must be positive");
        }

        let cors_origins = settings
            .cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            api: ApiConfig {
                host: settings.api_host,
                port: settings.api_port,
                surface: settings.app_surface,
                production: settings.app_env.eq_ignore_ascii_case("production"),
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: settings.database_max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                api_ttl_minutes: settings.jwt_api_ttl_minutes,
                web_ttl_minutes: settings.jwt_web_ttl_minutes,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
