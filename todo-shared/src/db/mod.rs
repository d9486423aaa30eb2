/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded, reversible schema migrations
/// - `store`: the [`store::Store`] / [`store::Session`] seam the handlers use
/// - `postgres`: store backed by PostgreSQL transactions
/// - `memory`: store kept in process memory
///
/// # Example
///
/// ```no_run
/// use todo_shared::db::{pool::{create_pool, DatabaseConfig}, postgres::PgStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let store = PgStore::new(create_pool(config).await?);
///     Ok(())
/// }
/// ```

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod store;
