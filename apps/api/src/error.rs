//! API error types and their HTTP mapping.
//!
//! Every error leaving a handler funnels through [`ApiError`], which
//! renders the uniform failure envelope:
//!
//! ```json
//! { "success": false, "message": "Insufficient stock for product 7: ..." }
//! ```
//!
//! ## Status Mapping
//! | Variant              | Status |
//! |----------------------|--------|
//! | `InvalidRequest`     | 400    |
//! | `InsufficientStock`  | 400    |
//! | `Unauthorized`       | 401    |
//! | `Forbidden`          | 403    |
//! | `NotFound`           | 404    |
//! | `Storage`            | 500    |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use lotus_core::CoreError;
use lotus_db::{DbError, SaleCommitError};

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body or query string is malformed or violates a
    /// domain rule checked before any write happens.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A referenced record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A product line cannot be covered by current stock.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    /// Missing, malformed, or expired credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The storage layer failed; details stay in the server log.
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::InsufficientStock { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRequest(reason) => ApiError::InvalidRequest(reason),
            CoreError::Validation(inner) => ApiError::InvalidRequest(inner.to_string()),
            CoreError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} not found: {}", entity, id))
            }
            CoreError::InsufficientStock {
                product_id,
                requested,
                available,
            } => ApiError::InsufficientStock {
                product_id,
                requested,
                available,
            },
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} not found: {}", entity, id))
            }
            other => ApiError::Storage(other.to_string()),
        }
    }
}

impl From<SaleCommitError> for ApiError {
    fn from(err: SaleCommitError) -> Self {
        match err {
            SaleCommitError::Domain(core) => core.into(),
            SaleCommitError::Storage(db) => db.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
