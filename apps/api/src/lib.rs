//! # Lotus API
//!
//! HTTP surface for the Lotus POS sale transaction engine:
//!
//! - **Sale commit** - `POST /api/sales` runs the atomic commit pipeline
//! - **Sale reads** - detail by id, paginated listing with role scoping
//! - **Auth** - verifies JWTs issued by the identity service
//! - **Health** - `/healthz` probes the database for orchestrators
//!
//! The server holds no domain logic: pricing and stock decisions live in
//! `lotus-core`, persistence in `lotus-db`. Handlers translate between
//! the wire and those crates.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

pub use auth::JwtManager;
pub use config::ApiConfig;
pub use error::ApiError;

use lotus_db::Database;

/// Shared application state, wrapped in an `Arc` at startup.
pub struct AppState {
    /// Database handle; repositories clone the pool per call.
    pub db: Database,
    /// Verifies (and in tooling, issues) JWT tokens.
    pub jwt: JwtManager,
    /// Loaded configuration, kept for introspection.
    pub config: ApiConfig,
}
