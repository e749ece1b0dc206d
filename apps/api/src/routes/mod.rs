//! HTTP routes and the JSON response envelope.
//!
//! ## Route Map
//! ```text
//! POST /api/sales       commit a sale                 (auth required)
//! GET  /api/sales       paginated listing              (auth required)
//! GET  /api/sales/:id   full sale detail               (auth required)
//! GET  /healthz         liveness + database probe      (public)
//! ```
//!
//! Every success payload is wrapped in the same envelope:
//! ```json
//! { "success": true, "data": ..., "message": "..." }
//! ```
//! Failures render through [`crate::error::ApiError`].

pub mod sales;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::auth::require_auth;
use crate::AppState;

/// Uniform success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps a payload with no message.
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data,
            message: None,
        }
    }

    /// Wraps a payload with a human-readable message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// Builds the application router.
///
/// Sale routes sit behind the JWT middleware; the health probe stays
/// public for orchestrators.
pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/sales", post(sales::create_sale).get(sales::list_sales))
        .route("/api/sales/:id", get(sales::get_sale))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(protected)
        .with_state(state)
}

/// `GET /healthz` - liveness probe.
///
/// Runs `SELECT 1` against the pool; 503 when the database is unreachable.
async fn healthz(State(state): State<Arc<AppState>>) -> Response {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
            .into_response()
    }
}
