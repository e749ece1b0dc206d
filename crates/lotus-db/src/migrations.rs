//! Embedded schema migrations.
//!
//! Every `.sql` file under `migrations/sqlite/` is compiled into the binary
//! by `sqlx::migrate!`, so a deployed server never reads migration files at
//! runtime. sqlx tracks what has run in the `_sqlx_migrations` table and
//! applies whatever is pending, in filename order, each inside its own
//! transaction.
//!
//! Schema changes go in a new `NNN_description.sql` file; applied files are
//! append-only and must never be edited.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations. Runs on every pool startup; a fully
/// migrated database is a no-op.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(
        embedded = MIGRATOR.migrations.len(),
        "Applying schema migrations"
    );

    MIGRATOR.run(pool).await?;

    info!("Schema is current");
    Ok(())
}

/// Embedded vs applied migration counts, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct MigrationStatus {
    pub total: usize,
    pub applied: usize,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.total
    }
}

/// Reads the migration bookkeeping table.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let total = MIGRATOR.migrations.len();

    // The bookkeeping table does not exist before the first run
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok(MigrationStatus {
        total,
        applied: applied as usize,
    })
}
