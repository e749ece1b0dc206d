//! API server configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults for local development:
//!
//! ```bash
//! LOTUS_BIND_ADDR=0.0.0.0:3000          # Address the HTTP server binds to
//! LOTUS_DATABASE_PATH=./lotus.db        # SQLite database file
//! LOTUS_JWT_SECRET=<secret>             # HMAC key for verifying tokens
//! LOTUS_TOKEN_EXPIRY_HOURS=24           # Lifetime of locally issued tokens
//! ```
//!
//! Malformed values fail startup with a [`ConfigError`] rather than
//! silently falling back.

use std::env;

use thiserror::Error;

/// Development fallback for `LOTUS_JWT_SECRET`.
///
/// Startup logs a warning when this is in use; production deployments set
/// the variable explicitly.
pub const DEV_JWT_SECRET: &str = "lotus-dev-secret-change-in-production";

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,

    /// SQLite file backing the store.
    pub database_path: String,

    /// Secret used to verify (and, in tooling, issue) JWT tokens.
    pub jwt_secret: String,

    /// Lifetime in hours for tokens issued by operator tooling.
    pub token_expiry_hours: i64,
}

impl ApiConfig {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<ApiConfig, ConfigError> {
        let config = ApiConfig {
            bind_addr: env::var("LOTUS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            database_path: env::var("LOTUS_DATABASE_PATH")
                .unwrap_or_else(|_| "./lotus.db".to_string()),
            jwt_secret: env::var("LOTUS_JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),
            token_expiry_hours: env::var("LOTUS_TOKEN_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("LOTUS_TOKEN_EXPIRY_HOURS".to_string()))?,
        };

        if config.token_expiry_hours <= 0 {
            return Err(ConfigError::InvalidValue(
                "LOTUS_TOKEN_EXPIRY_HOURS".to_string(),
            ));
        }

        Ok(config)
    }

    /// True when the JWT secret is still the development fallback.
    pub fn using_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
