//! # lotus-db: Database Layer for Lotus POS
//!
//! This crate provides database access for the Lotus POS backend.
//! It uses SQLite for storage with sqlx for async operations, and owns the
//! one multi-statement write in the system: the sale commit transaction.
//!
//! ## Where This Crate Sits
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │                        Lotus POS Data Flow                            │
//! │                                                                       │
//! │  HTTP handler (POST /api/sales)                                       │
//! │       │                                                               │
//! │       ▼                                                               │
//! │  ┌───────────────────────────────────────────────────────────────┐   │
//! │  │                     lotus-db (THIS CRATE)                     │   │
//! │  │                                                               │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐ │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │   (sale.rs)   │    │  (embedded)  │ │   │
//! │  │   │               │    │               │    │              │ │   │
//! │  │   │ SqlitePool    │    │ SaleRepo      │    │ 001_initial_ │ │   │
//! │  │   │ Connection    │◄───│ ProductRepo   │    │ schema.sql   │ │   │
//! │  │   │ Management    │    │ CustomerRepo  │    │              │ │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘ │   │
//! │  │                                                               │   │
//! │  │   Pricing and stock planning come from lotus-core; this       │   │
//! │  │   crate supplies rows and transactional writes.               │   │
//! │  └───────────────────────────────────────────────────────────────┘   │
//! │       │                                                               │
//! │       ▼                                                               │
//! │  ┌───────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                           │   │
//! │  │   ./lotus.db (WAL, foreign keys ON)                           │   │
//! │  └───────────────────────────────────────────────────────────────┘   │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Map
//!
//! - [`pool`] - [`Database`] handle and SQLite pool settings
//! - [`migrations`] - schema migrations compiled into the binary
//! - [`error`] - storage error categories and the commit error union
//! - [`repository`] - per-aggregate query types (sale, catalog, customer, user)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lotus_db::{Database, DbConfig, NewSale};
//!
//! let db = Database::new(DbConfig::new("path/to/lotus.db")).await?;
//!
//! // One call commits the whole sale or none of it
//! let detail = db.sales().commit_sale(&new_sale).await?;
//! println!("committed {}", detail.sale.invoice_number);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, SaleCommitError};
pub use pool::{Database, DbConfig};

// Repository types surface at the crate root so callers skip the long paths
pub use repository::catalog::{
    NewProduct, NewPromotion, NewService, ProductRepository, PromotionRepository,
    ServiceRepository,
};
pub use repository::customer::{CustomerRepository, NewCustomer};
pub use repository::sale::{
    CashierRef, NewSale, SaleDetail, SaleItemDetail, SaleListFilter, SaleListPage,
    SaleRepository, SaleSummary,
};
pub use repository::user::{NewUser, UserRepository};
