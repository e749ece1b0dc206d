//! # Storage Errors
//!
//! [`DbError`] categorizes raw `sqlx::Error`s into the cases callers act
//! on (not-found, constraint violations, infrastructure failures), and
//! [`SaleCommitError`] joins it with the domain's `CoreError` for the one
//! operation where both can abort the work: the sale commit transaction.
//! The HTTP app maps both onto status codes; nothing here knows about HTTP.

use lotus_core::CoreError;
use thiserror::Error;

/// A failed storage operation, categorized.
#[derive(Debug, Error)]
pub enum DbError {
    /// A row the caller named does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A value that must be unique already exists.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate customer phone or username
    /// - Invoice number collision (retried by the commit path)
    #[error("Duplicate {field}: already exists")]
    UniqueViolation { field: String },

    /// A write referenced a row that is not there.
    ///
    /// ## When This Occurs
    /// - Referencing a non-existent category_id or promotion_id
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Could not open or reach the database.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A schema migration did not apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// The engine rejected a statement.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin, commit, or rollback itself failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Every pooled connection stayed busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Anything sqlx raised that fits no category above.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Builds [`DbError::NotFound`] from an entity name and anything that
    /// renders as an id.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

/// Categorizes sqlx errors.
///
/// SQLite reports constraint failures only through the database error
/// message, so UNIQUE and FOREIGN KEY violations are recognized by the
/// message prefix the engine emits.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // UNIQUE: "UNIQUE constraint failed: <table>.<column>"
                // FK: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation { field }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result alias for storage operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Sale Commit Error
// =============================================================================

/// Failure of the sale commit transaction.
///
/// The commit can abort for two distinct reasons and callers need to tell
/// them apart: a domain rule said no (stock, missing customer, bad input),
/// or storage itself failed. Both roll the transaction back completely.
#[derive(Debug, Error)]
pub enum SaleCommitError {
    /// A domain rule rejected the sale (nothing was persisted).
    #[error("{0}")]
    Domain(#[from] CoreError),

    /// The storage layer failed (nothing was persisted).
    #[error("{0}")]
    Storage(#[from] DbError),
}

// =============================================================================
// Unit Tests
// =============================================================================
