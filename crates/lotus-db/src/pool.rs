//! # Connection Pool
//!
//! One `SqlitePool` per process, wrapped in [`Database`] which hands out
//! repository values. The pool is configured for a small concurrent API:
//! WAL journaling so list queries never block a commit, foreign keys ON
//! (SQLite ships with them off), and `NORMAL` synchronous durability.
//!
//! A sale commit holds one pooled connection from `begin()` until the
//! transaction resolves; every other operation borrows a connection per
//! query.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::catalog::{ProductRepository, PromotionRepository, ServiceRepository};
use crate::repository::customer::CustomerRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::user::UserRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Pool settings. Construct with [`DbConfig::new`] or
/// [`DbConfig::in_memory`] and override fields as needed:
///
/// ```rust,ignore
/// let config = DbConfig {
///     max_connections: 10,
///     ..DbConfig::new("/var/lib/lotus/lotus.db")
/// };
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file path; created on first connect when missing.
    pub database_path: PathBuf,

    /// Pool size cap (default 5).
    pub max_connections: u32,

    /// Connections kept warm (default 1).
    pub min_connections: u32,

    /// How long an acquire may wait before failing (default 30s).
    pub connect_timeout: Duration,

    /// Idle time before a pooled connection is closed (default 10min).
    pub idle_timeout: Duration,

    /// Apply embedded migrations during [`Database::new`] (default true).
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Private per-test database.
    ///
    /// Everything lives on a single connection; a second connection would
    /// open a different, empty `:memory:` store.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        // sqlite://path?mode=rwc creates the file when missing
        let url = format!("sqlite://{}?mode=rwc", self.database_path.display());

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            // WAL: readers never block the commit transaction
            .journal_mode(SqliteJournalMode::Wal)
            // Survives a process crash; the last transaction may be lost
            // on power failure
            .synchronous(SqliteSynchronous::Normal)
            // The schema relies on FK enforcement
            .foreign_keys(true)
            .create_if_missing(true);

        Ok(options)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle over the pool; hands out repositories.
///
/// ```rust,ignore
/// let detail = state.db.sales().get_detail(sale_id).await?;
/// ```
///
/// Cloning is cheap, all clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "Opening database"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!("Pool ready");

        if config.run_migrations {
            migrations::run_migrations(&pool).await?;
        }

        Ok(Database { pool })
    }

    /// The raw pool, for queries no repository covers (test fixtures).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Sale commit transaction and reader.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Products and categories.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Service offerings.
    pub fn services(&self) -> ServiceRepository {
        ServiceRepository::new(self.pool.clone())
    }

    /// Time-windowed discounts.
    pub fn promotions(&self) -> PromotionRepository {
        PromotionRepository::new(self.pool.clone())
    }

    /// Customer records.
    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    /// Cashier accounts.
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// True when the store answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);

        let status = migrations::migration_status(db.pool()).await.unwrap();
        assert!(status.is_current());
    }

    #[test]
    fn test_config_overrides() {
        let config = DbConfig {
            max_connections: 10,
            run_migrations: false,
            ..DbConfig::new("/tmp/test.db")
        };

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert!(!config.run_migrations);
    }
}
