/// Database migration runner
///
/// Migrations live in the workspace-level `migrations/` directory and are
/// embedded at compile time. Each one is reversible:
///
/// - `{version}_{name}.up.sql` - forward
/// - `{version}_{name}.down.sql` - backward
///
/// Current history:
///
/// 1. create `users` and `todos`
/// 2. add the nullable, unique `users.phone_number` column

use sqlx::{
    migrate::{MigrateError, Migrator},
    postgres::PgPool,
};
use tracing::{debug, info, warn};

/// Embedded migration set
pub static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Migration status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Number of successfully applied migrations
    pub applied_migrations: usize,

    /// Highest applied version
    pub latest_version: Option<i64>,

    /// Whether every embedded migration has been applied
    pub is_up_to_date: bool,
}

/// Version of the newest embedded migration
pub fn latest_known_version() -> Option<i64> {
    MIGRATOR.iter().map(|m| m.version).max()
}

/// Applies all pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    info!("Running database migrations");

    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("Database migrations up to date");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Migration failed");
            Err(e)
        }
    }
}

/// Reverts applied migrations newer than `target_version`
///
/// `0` reverts everything.
pub async fn revert_migrations(pool: &PgPool, target_version: i64) -> Result<(), MigrateError> {
    info!(target_version, "Reverting database migrations");
    MIGRATOR.undo(pool, target_version).await
}

/// Reads the applied-migration bookkeeping table
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = current_schema()
            AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        debug!("Migrations table does not exist yet");
        return Ok(MigrationStatus {
            applied_migrations: 0,
            latest_version: None,
            is_up_to_date: MIGRATOR.iter().next().is_none(),
        });
    }

    let (count, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success = true",
    )
    .fetch_one(pool)
    .await?;

    Ok(MigrationStatus {
        applied_migrations: count as usize,
        latest_version,
        is_up_to_date: latest_version == latest_known_version(),
    })
}
