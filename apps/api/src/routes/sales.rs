//! Sale routes: commit, detail, and listing.
//!
//! Handlers stay thin: they translate the wire shape, call into
//! `lotus-db`, and wrap the result. Pricing and stock decisions never
//! happen here.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use lotus_core::{RequestedLine, SaleStatus};
use lotus_db::{NewSale, SaleDetail, SaleListFilter, SaleListPage};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::ApiResponse;
use crate::AppState;

/// Request body for committing a sale.
///
/// Lines carry only an item reference and a quantity. Any price or total
/// fields a client sends are ignored; pricing is resolved server-side
/// from current catalog rows.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub customer_id: i64,
    pub promotion_id: Option<i64>,
    pub items: Vec<RequestedLine>,
    /// Status token, case-insensitive. Defaults to UNPAID.
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Query parameters for the sale listing.
#[derive(Debug, Deserialize)]
pub struct ListSalesQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub status: Option<String>,
}

fn parse_status(raw: &str) -> Result<SaleStatus, ApiError> {
    SaleStatus::parse(raw)
        .ok_or_else(|| ApiError::InvalidRequest(format!("Unknown sale status: {}", raw)))
}

/// `POST /api/sales` - commits a sale atomically.
pub async fn create_sale(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<CreateSaleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<SaleDetail>>), ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;

    let status = match body.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => SaleStatus::default(),
    };

    let input = NewSale {
        customer_id: body.customer_id,
        // The cashier is whoever holds the token, never a body field.
        user_id: user.user_id,
        promotion_id: body.promotion_id,
        lines: body.items,
        status,
        notes: body.notes,
    };

    let detail = state.db.sales().commit_sale(&input).await?;

    info!(
        invoice = %detail.sale.invoice_number,
        cashier = %user.username,
        "Sale created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(detail, "Sale created successfully")),
    ))
}

/// `GET /api/sales/:id` - full sale detail with customer, cashier,
/// promotion, and named line items.
pub async fn get_sale(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<SaleDetail>>, ApiError> {
    let detail = state
        .db
        .sales()
        .get_detail(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sale not found: {}", id)))?;

    Ok(Json(ApiResponse::ok(detail)))
}

/// `GET /api/sales` - paginated listing, newest first.
///
/// The caller's role decides how far back the listing reaches: employees
/// see the trailing visibility window, admins see everything.
pub async fn list_sales(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListSalesQuery>,
) -> Result<Json<ApiResponse<SaleListPage>>, ApiError> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(parse_status(raw)?),
        None => None,
    };

    let defaults = SaleListFilter::default();
    let filter = SaleListFilter {
        status,
        search: query.search,
        visible_after: user.role.sale_visibility_cutoff(Utc::now()),
        page: query.page.unwrap_or(defaults.page),
        limit: query.limit.unwrap_or(defaults.limit),
    };

    let page = state.db.sales().list(&filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

// =============================================================================
// Route Tests
// =============================================================================
