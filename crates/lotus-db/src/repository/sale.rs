//! # Sale Commit and Reads
//!
//! Sale commit and read paths. Committing a sale is the one multi-statement
//! write in the system and runs inside a single transaction:
//!
//! 1. Resolve the customer, cashier, optional promotion, and every
//!    referenced product and service from current rows.
//! 2. Price the lines server-side and compute totals. Client-sent prices
//!    are never trusted.
//! 3. Insert the sale header, retrying with a fresh invoice number if the
//!    generated one collides.
//! 4. Insert the item rows.
//! 5. Decrement product stock with a guarded `stock >= qty` update. A row
//!    that no longer has enough stock aborts the whole transaction.
//!
//! Reads never join everything into one giant query; the detail view is
//! assembled from a handful of small lookups, matching how the rest of the
//! repositories read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult, SaleCommitError};
use lotus_core::pricing::{compute_totals, plan_decrements, resolve_lines};
use lotus_core::validation::{validate_entity_id, validate_quantity};
use lotus_core::{
    CoreError, Customer, LineRef, Product, Promotion, RequestedLine, Sale, SaleStatus, ServiceItem,
};

/// How many times a colliding invoice number is regenerated before the
/// commit gives up.
const INVOICE_RETRY_LIMIT: u32 = 3;

/// Default and maximum page sizes for sale listings.
const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// Input for committing a sale.
///
/// Lines carry only references and quantities; unit prices are resolved
/// from the catalog inside the commit transaction.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub customer_id: i64,
    pub user_id: i64,
    pub promotion_id: Option<i64>,
    pub lines: Vec<RequestedLine>,
    pub status: SaleStatus,
    pub notes: Option<String>,
}

/// The cashier slice of a sale detail; id and display name only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CashierRef {
    pub id: i64,
    pub name: String,
}

/// One line of a committed sale, joined with its catalog name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemDetail {
    pub id: i64,
    #[serde(flatten)]
    pub line: LineRef,
    pub name: String,
    pub category: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// A fully joined sale: header, customer, cashier, promotion, and lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub customer: Customer,
    pub cashier: CashierRef,
    pub promotion: Option<Promotion>,
    pub items: Vec<SaleItemDetail>,
}

/// One row of the sale listing. Carries the customer name and an item
/// count instead of the full line detail.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummary {
    pub id: i64,
    pub invoice_number: String,
    pub customer_id: i64,
    pub customer_name: String,
    pub user_id: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub status: SaleStatus,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Filter and paging controls for [`SaleRepository::list`].
///
/// `visible_after`, when set, hides sales created before that instant.
/// Callers derive it from the requesting user's role.
#[derive(Debug, Clone)]
pub struct SaleListFilter {
    pub status: Option<SaleStatus>,
    pub search: Option<String>,
    pub visible_after: Option<DateTime<Utc>>,
    pub page: i64,
    pub limit: i64,
}

impl Default for SaleListFilter {
    fn default() -> Self {
        SaleListFilter {
            status: None,
            search: None,
            visible_after: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of sale summaries plus paging metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleListPage {
    pub sales: Vec<SaleSummary>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// Intermediate row for the item detail join.
#[derive(Debug, sqlx::FromRow)]
struct ItemDetailRow {
    id: i64,
    product_id: Option<i64>,
    service_id: Option<i64>,
    quantity: i64,
    unit_price_cents: i64,
    line_total_cents: i64,
    product_name: Option<String>,
    service_name: Option<String>,
    category: Option<String>,
}

/// The sale commit transaction and its readers.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Commits a sale atomically.
    ///
    /// Either the sale header, all item rows, and every stock decrement
    /// land together, or none of them do. Prices and the promotion window
    /// are evaluated against current rows at commit time; a promotion that
    /// is expired or disabled contributes a zero discount but is still
    /// recorded on the sale. Stock is decremented only where
    /// `stock >= quantity` still holds, so concurrent commits cannot drive
    /// stock negative.
    pub async fn commit_sale(&self, input: &NewSale) -> Result<SaleDetail, SaleCommitError> {
        if input.lines.is_empty() {
            return Err(CoreError::InvalidRequest(
                "sale must contain at least one line".to_string(),
            )
            .into());
        }
        validate_entity_id("customerId", input.customer_id).map_err(CoreError::from)?;
        validate_entity_id("userId", input.user_id).map_err(CoreError::from)?;
        if let Some(promotion_id) = input.promotion_id {
            validate_entity_id("promotionId", promotion_id).map_err(CoreError::from)?;
        }
        for line in &input.lines {
            validate_quantity(line.quantity).map_err(CoreError::from)?;
        }

        let now = Utc::now();

        debug!(
            customer_id = input.customer_id,
            user_id = input.user_id,
            lines = input.lines.len(),
            "Committing sale"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, first_name, last_name, phone, address, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(input.customer_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::from)?
        .ok_or(CoreError::not_found("Customer", input.customer_id))?;

        let cashier = sqlx::query_as::<_, CashierRef>("SELECT id, name FROM users WHERE id = ?1")
            .bind(input.user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DbError::from)?
            .ok_or(CoreError::not_found("User", input.user_id))?;

        let promotion = match input.promotion_id {
            Some(promotion_id) => Some(
                sqlx::query_as::<_, Promotion>(
                    r#"
                    SELECT id, name, discount_value, is_percent, start_date, end_date,
                           is_active, created_at, updated_at
                    FROM promotions
                    WHERE id = ?1
                    "#,
                )
                .bind(promotion_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DbError::from)?
                .ok_or(CoreError::not_found("Promotion", promotion_id))?,
            ),
            None => None,
        };

        let mut product_ids: Vec<i64> =
            input.lines.iter().filter_map(|l| l.line.product_id()).collect();
        product_ids.sort_unstable();
        product_ids.dedup();

        let mut products = Vec::with_capacity(product_ids.len());
        for product_id in product_ids {
            // Missing rows are left out; pricing reports them as NotFound.
            let found = sqlx::query_as::<_, Product>(
                r#"
                SELECT id, name, description, price_cents, cost_price_cents, stock,
                       min_stock, category_id, is_active, created_at, updated_at
                FROM products
                WHERE id = ?1
                "#,
            )
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DbError::from)?;
            if let Some(product) = found {
                products.push(product);
            }
        }

        let mut service_ids: Vec<i64> =
            input.lines.iter().filter_map(|l| l.line.service_id()).collect();
        service_ids.sort_unstable();
        service_ids.dedup();

        let mut services = Vec::with_capacity(service_ids.len());
        for service_id in service_ids {
            let found = sqlx::query_as::<_, ServiceItem>(
                r#"
                SELECT id, name, description, price_cents, is_active, created_at, updated_at
                FROM services
                WHERE id = ?1
                "#,
            )
            .bind(service_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DbError::from)?;
            if let Some(service) = found {
                services.push(service);
            }
        }

        let priced = resolve_lines(&input.lines, &products, &services)?;
        let totals = compute_totals(&priced, promotion.as_ref(), now);
        let decrements = plan_decrements(&priced, &products)?;

        let mut attempt = 0;
        let (sale_id, invoice_number) = loop {
            attempt += 1;
            let invoice_number = generate_invoice_number(now);

            let inserted = sqlx::query(
                r#"
                INSERT INTO sales (invoice_number, customer_id, user_id, promotion_id,
                                   subtotal_cents, discount_cents, total_cents, status,
                                   notes, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&invoice_number)
            .bind(input.customer_id)
            .bind(input.user_id)
            .bind(input.promotion_id)
            .bind(totals.subtotal_cents)
            .bind(totals.discount_cents)
            .bind(totals.total_cents)
            .bind(input.status)
            .bind(&input.notes)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from);

            // SQLite aborts only the failed statement, so the transaction
            // stays usable for a retry with a fresh number.
            match inserted {
                Ok(done) => break (done.last_insert_rowid(), invoice_number),
                Err(DbError::UniqueViolation { .. }) if attempt < INVOICE_RETRY_LIMIT => {
                    warn!(attempt, invoice = %invoice_number, "Invoice number collision, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        };

        for line in &priced {
            sqlx::query(
                r#"
                INSERT INTO sale_items (sale_id, product_id, service_id, quantity,
                                        unit_price_cents, line_total_cents)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(sale_id)
            .bind(line.line.product_id())
            .bind(line.line.service_id())
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.line_total_cents())
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }

        for decrement in &decrements {
            let updated = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?1, updated_at = ?2
                WHERE id = ?3 AND stock >= ?1
                "#,
            )
            .bind(decrement.quantity)
            .bind(now)
            .bind(decrement.product_id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            if updated.rows_affected() == 0 {
                let available: i64 = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                    .bind(decrement.product_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(DbError::from)?
                    .unwrap_or(0);

                // Dropping the open transaction rolls back the header and
                // item rows.
                return Err(CoreError::InsufficientStock {
                    product_id: decrement.product_id,
                    requested: decrement.quantity,
                    available,
                }
                .into());
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id,
            invoice = %invoice_number,
            customer = %customer.full_name(),
            cashier = %cashier.name,
            total_cents = totals.total_cents,
            "Sale committed"
        );

        let detail = self
            .get_detail(sale_id)
            .await?
            .ok_or(DbError::not_found("Sale", sale_id))?;

        Ok(detail)
    }

    /// Gets a sale header by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, invoice_number, customer_id, user_id, promotion_id,
                   subtotal_cents, discount_cents, total_cents, status, notes, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(sale)
    }

    /// Gets a sale with its customer, cashier, promotion, and line detail.
    pub async fn get_detail(&self, id: i64) -> DbResult<Option<SaleDetail>> {
        let Some(sale) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, first_name, last_name, phone, address, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(sale.customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or(DbError::not_found("Customer", sale.customer_id))?;

        let cashier = sqlx::query_as::<_, CashierRef>("SELECT id, name FROM users WHERE id = ?1")
            .bind(sale.user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or(DbError::not_found("User", sale.user_id))?;

        let promotion = match sale.promotion_id {
            Some(promotion_id) => sqlx::query_as::<_, Promotion>(
                r#"
                SELECT id, name, discount_value, is_percent, start_date, end_date,
                       is_active, created_at, updated_at
                FROM promotions
                WHERE id = ?1
                "#,
            )
            .bind(promotion_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?,
            None => None,
        };

        let rows = sqlx::query_as::<_, ItemDetailRow>(
            r#"
            SELECT si.id, si.product_id, si.service_id, si.quantity,
                   si.unit_price_cents, si.line_total_cents,
                   p.name AS product_name,
                   sv.name AS service_name,
                   c.name AS category
            FROM sale_items si
            LEFT JOIN products p ON p.id = si.product_id
            LEFT JOIN services sv ON sv.id = si.service_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE si.sale_id = ?1
            ORDER BY si.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .filter_map(|row| {
                let line = LineRef::from_columns(row.product_id, row.service_id)?;
                Some(SaleItemDetail {
                    id: row.id,
                    line,
                    name: row.product_name.or(row.service_name).unwrap_or_default(),
                    category: row.category,
                    quantity: row.quantity,
                    unit_price_cents: row.unit_price_cents,
                    line_total_cents: row.line_total_cents,
                })
            })
            .collect();

        Ok(Some(SaleDetail {
            sale,
            customer,
            cashier,
            promotion,
            items,
        }))
    }

    /// Lists sales newest first, with optional status, search, and
    /// visibility filters.
    ///
    /// Search matches invoice numbers and customer names or phones. Page
    /// numbers start at 1; out-of-range pages return an empty list with
    /// the real total.
    pub async fn list(&self, filter: &SaleListFilter) -> DbResult<SaleListPage> {
        let page = filter.page.max(1);
        let limit = filter.limit.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) * limit;

        let status = filter.status.map(|s| s.as_str());
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| format!("%{}%", term));

        let sales = sqlx::query_as::<_, SaleSummary>(
            r#"
            SELECT s.id, s.invoice_number, s.customer_id,
                   c.first_name || ' ' || c.last_name AS customer_name,
                   s.user_id, s.subtotal_cents, s.discount_cents, s.total_cents,
                   s.status, s.created_at,
                   (SELECT COUNT(*) FROM sale_items si WHERE si.sale_id = s.id) AS item_count
            FROM sales s
            JOIN customers c ON c.id = s.customer_id
            WHERE (?1 IS NULL OR s.status = ?1)
              AND (?2 IS NULL OR s.created_at >= ?2)
              AND (?3 IS NULL OR s.invoice_number LIKE ?3
                   OR c.first_name LIKE ?3 OR c.last_name LIKE ?3 OR c.phone LIKE ?3)
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT ?4 OFFSET ?5
            "#,
        )
        .bind(status)
        .bind(filter.visible_after)
        .bind(&search)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM sales s
            JOIN customers c ON c.id = s.customer_id
            WHERE (?1 IS NULL OR s.status = ?1)
              AND (?2 IS NULL OR s.created_at >= ?2)
              AND (?3 IS NULL OR s.invoice_number LIKE ?3
                   OR c.first_name LIKE ?3 OR c.last_name LIKE ?3 OR c.phone LIKE ?3)
            "#,
        )
        .bind(status)
        .bind(filter.visible_after)
        .bind(&search)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };

        Ok(SaleListPage {
            sales,
            total,
            page,
            limit,
            total_pages,
        })
    }
}

/// Builds an invoice number: `INV`, the date as YYMMDD, and four random
/// digits. Collisions are possible and handled by the commit retry loop;
/// the `UNIQUE` index on `invoice_number` is the arbiter.
fn generate_invoice_number(now: DateTime<Utc>) -> String {
    let suffix = (Uuid::new_v4().as_u128() % 10_000) as u32;
    format!("INV{}{:04}", now.format("%y%m%d"), suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================
