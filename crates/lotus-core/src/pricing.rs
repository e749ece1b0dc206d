//! # Pricing & Promotion Resolver
//!
//! Authoritative price resolution, totals, and the stock guard.
//!
//! ## Resolution Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Server-Side Pricing Pipeline                         │
//! │                                                                         │
//! │  Client payload: [{kind, itemId, quantity}, ..]   (no prices trusted)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolve_lines() ──── catalog rows ───► [PricedLine]                   │
//! │       │                  (unit prices snapshotted from Product/Service)│
//! │       ▼                                                                 │
//! │  compute_totals() ─── promotion row ──► SaleTotals                     │
//! │       │                  (ineffective promotion ⇒ zero discount)       │
//! │       ▼                                                                 │
//! │  plan_decrements() ── stock levels ───► [StockDecrement]               │
//! │                          (product lines only; services exempt)         │
//! │                                                                         │
//! │  All three are pure: rows in, values out. The commit transaction       │
//! │  feeds them rows read inside its own transaction scope.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! Percent discounts are computed once on the subtotal with half-up
//! rounding, never per line. See [`Money::percent_of`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{LineRef, Product, Promotion, ServiceItem};

// =============================================================================
// Input / Output Types
// =============================================================================

/// A line as submitted for commit: what and how many, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedLine {
    #[serde(flatten)]
    pub line: LineRef,
    pub quantity: i64,
}

/// A line with its authoritative price resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    #[serde(flatten)]
    pub line: LineRef,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl PricedLine {
    /// Line total, recomputed (unit price × quantity).
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

/// Server-computed monetary summary of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

/// One pending stock decrement produced by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDecrement {
    pub product_id: i64,
    pub quantity: i64,
}

// =============================================================================
// Price Resolution
// =============================================================================

/// Resolves authoritative unit prices for requested lines.
///
/// Prices and names come from the supplied catalog rows; nothing submitted
/// by the client is trusted. Line order is preserved.
///
/// ## Errors
/// `NotFound` when a line references a product or service id with no
/// catalog row.
pub fn resolve_lines(
    requested: &[RequestedLine],
    products: &[Product],
    services: &[ServiceItem],
) -> CoreResult<Vec<PricedLine>> {
    let mut priced = Vec::with_capacity(requested.len());

    for req in requested {
        let (name, unit_price_cents) = match req.line {
            LineRef::Product(id) => {
                let product = products
                    .iter()
                    .find(|p| p.id == id)
                    .ok_or(CoreError::not_found("Product", id))?;
                (product.name.clone(), product.price_cents)
            }
            LineRef::Service(id) => {
                let service = services
                    .iter()
                    .find(|s| s.id == id)
                    .ok_or(CoreError::not_found("Service", id))?;
                (service.name.clone(), service.price_cents)
            }
        };

        priced.push(PricedLine {
            line: req.line,
            name,
            unit_price_cents,
            quantity: req.quantity,
        });
    }

    Ok(priced)
}

// =============================================================================
// Totals
// =============================================================================

/// Discount arithmetic shared by cart preview and commit.
///
/// `discount_value` is basis points when `is_percent` (1000 = 10%), cents
/// otherwise. The result is clamped to `[0, subtotal]`; a flat discount can
/// zero a sale but never push the total negative.
pub fn promotion_discount_cents(subtotal_cents: i64, discount_value: i64, is_percent: bool) -> i64 {
    let raw = if is_percent {
        Money::from_cents(subtotal_cents)
            .percent_of(discount_value)
            .cents()
    } else {
        discount_value
    };

    raw.clamp(0, subtotal_cents.max(0))
}

/// Computes subtotal, discount, and total for priced lines.
///
/// The promotion row (if any) contributes a discount only while effective
/// at `now`; a disabled or out-of-window promotion silently contributes
/// zero and never fails the sale.
pub fn compute_totals(
    lines: &[PricedLine],
    promotion: Option<&Promotion>,
    now: DateTime<Utc>,
) -> SaleTotals {
    let subtotal_cents: i64 = lines.iter().map(|l| l.line_total_cents()).sum();

    let discount_cents = match promotion {
        Some(promo) if promo.is_effective_at(now) => {
            promotion_discount_cents(subtotal_cents, promo.discount_value, promo.is_percent)
        }
        _ => 0,
    };

    SaleTotals {
        subtotal_cents,
        discount_cents,
        total_cents: (subtotal_cents - discount_cents).max(0),
    }
}

// =============================================================================
// Inventory Guard
// =============================================================================

/// Checks stock for every product line and plans the decrements.
///
/// Each line is checked independently against the supplied stock levels;
/// the conditional decrement inside the commit transaction is the final
/// arbiter under concurrency. Service lines are exempt and produce no
/// decrement.
///
/// ## Errors
/// `InsufficientStock` with the product id, requested and available
/// quantities for the first line that cannot be covered. `NotFound` when a
/// product row is missing from the supplied slice.
pub fn plan_decrements(
    lines: &[PricedLine],
    products: &[Product],
) -> CoreResult<Vec<StockDecrement>> {
    let mut decrements = Vec::new();

    for line in lines {
        let Some(product_id) = line.line.product_id() else {
            continue;
        };

        let product = products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or(CoreError::not_found("Product", product_id))?;

        if !product.can_fulfill(line.quantity) {
            return Err(CoreError::InsufficientStock {
                product_id,
                requested: line.quantity,
                available: product.stock,
            });
        }

        decrements.push(StockDecrement {
            product_id,
            quantity: line.quantity,
        });
    }

    Ok(decrements)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_product(id: i64, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id,
            name: format!("Product {}", id),
            description: None,
            price_cents,
            cost_price_cents: price_cents / 2,
            stock,
            min_stock: 5,
            category_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn test_service(id: i64, price_cents: i64) -> ServiceItem {
        let now = Utc::now();
        ServiceItem {
            id,
            name: format!("Service {}", id),
            description: None,
            price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn promo(discount_value: i64, is_percent: bool, active: bool, expired: bool) -> Promotion {
        let now = Utc::now();
        let (start, end) = if expired {
            (now - Duration::days(10), now - Duration::days(1))
        } else {
            (now - Duration::days(1), now + Duration::days(10))
        };
        Promotion {
            id: 1,
            name: "Promo".to_string(),
            discount_value,
            is_percent,
            start_date: start,
            end_date: end,
            is_active: active,
            created_at: now,
            updated_at: now,
        }
    }

    fn requested(line: LineRef, quantity: i64) -> RequestedLine {
        RequestedLine { line, quantity }
    }

    #[test]
    fn test_resolve_lines_snapshots_catalog_prices() {
        let products = vec![test_product(1, 1500, 10)];
        let services = vec![test_service(2, 3000)];
        let lines = vec![
            requested(LineRef::Product(1), 2),
            requested(LineRef::Service(2), 1),
        ];

        let priced = resolve_lines(&lines, &products, &services).unwrap();

        assert_eq!(priced.len(), 2);
        assert_eq!(priced[0].unit_price_cents, 1500);
        assert_eq!(priced[0].name, "Product 1");
        assert_eq!(priced[0].line_total_cents(), 3000);
        assert_eq!(priced[1].unit_price_cents, 3000);
        assert_eq!(priced[1].line.service_id(), Some(2));
    }

    #[test]
    fn test_resolve_lines_unknown_product() {
        let err = resolve_lines(&[requested(LineRef::Product(99), 1)], &[], &[]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotFound {
                entity: "Product",
                id: 99
            }
        ));
    }

    #[test]
    fn test_resolve_lines_unknown_service() {
        let products = vec![test_product(7, 1000, 5)];
        let err =
            resolve_lines(&[requested(LineRef::Service(7), 1)], &products, &[]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotFound {
                entity: "Service",
                id: 7
            }
        ));
    }

    #[test]
    fn test_totals_without_promotion() {
        let priced = resolve_lines(
            &[
                requested(LineRef::Product(1), 2),
                requested(LineRef::Service(2), 1),
            ],
            &[test_product(1, 1500, 10)],
            &[test_service(2, 3000)],
        )
        .unwrap();

        let totals = compute_totals(&priced, None, Utc::now());

        assert_eq!(totals.subtotal_cents, 6000);
        assert_eq!(totals.discount_cents, 0);
        assert_eq!(totals.total_cents, 6000);
    }

    #[test]
    fn test_totals_recompute_identically() {
        // No hidden accumulators: the same lines and clock always produce
        // the same numbers.
        let priced = resolve_lines(
            &[
                requested(LineRef::Product(1), 3),
                requested(LineRef::Service(2), 2),
            ],
            &[test_product(1, 1099, 10)],
            &[test_service(2, 2500)],
        )
        .unwrap();

        let percent = promo(825, true, true, false);
        let now = Utc::now();

        let first = compute_totals(&priced, Some(&percent), now);
        let second = compute_totals(&priced, Some(&percent), now);

        assert_eq!(first, second);
        assert_eq!(first.subtotal_cents, 8297);
    }

    #[test]
    fn test_percent_discount_rounds_on_subtotal_only() {
        // Two lines of 333 each; 10% of 666 is 66.6 → 67.
        // Per-line rounding would give 33 + 33 = 66.
        let priced = resolve_lines(
            &[
                requested(LineRef::Product(1), 1),
                requested(LineRef::Product(2), 1),
            ],
            &[test_product(1, 333, 10), test_product(2, 333, 10)],
            &[],
        )
        .unwrap();

        let totals = compute_totals(&priced, Some(&promo(1000, true, true, false)), Utc::now());

        assert_eq!(totals.subtotal_cents, 666);
        assert_eq!(totals.discount_cents, 67);
        assert_eq!(totals.total_cents, 599);
    }

    #[test]
    fn test_flat_discount_clamped_to_subtotal() {
        let priced = resolve_lines(
            &[requested(LineRef::Product(1), 1)],
            &[test_product(1, 500, 10)],
            &[],
        )
        .unwrap();

        let totals = compute_totals(&priced, Some(&promo(99_999, false, true, false)), Utc::now());

        assert_eq!(totals.discount_cents, 500);
        assert_eq!(totals.total_cents, 0);
    }

    #[test]
    fn test_expired_promotion_contributes_zero() {
        let priced = resolve_lines(
            &[requested(LineRef::Product(1), 1)],
            &[test_product(1, 10000, 10)],
            &[],
        )
        .unwrap();

        let expired = promo(1000, true, true, true);
        let totals = compute_totals(&priced, Some(&expired), Utc::now());

        assert_eq!(totals.discount_cents, 0);
        assert_eq!(totals.total_cents, 10000);
    }

    #[test]
    fn test_disabled_promotion_contributes_zero() {
        let priced = resolve_lines(
            &[requested(LineRef::Product(1), 1)],
            &[test_product(1, 10000, 10)],
            &[],
        )
        .unwrap();

        let disabled = promo(1000, true, false, false);
        let totals = compute_totals(&priced, Some(&disabled), Utc::now());

        assert_eq!(totals.discount_cents, 0);
    }

    #[test]
    fn test_negative_discount_value_clamped_to_zero() {
        assert_eq!(promotion_discount_cents(1000, -500, false), 0);
        assert_eq!(promotion_discount_cents(1000, -500, true), 0);
    }

    #[test]
    fn test_plan_decrements_skips_services() {
        let priced = resolve_lines(
            &[
                requested(LineRef::Product(1), 3),
                requested(LineRef::Service(2), 5),
            ],
            &[test_product(1, 1000, 10)],
            &[test_service(2, 500)],
        )
        .unwrap();

        let decrements = plan_decrements(&priced, &[test_product(1, 1000, 10)]).unwrap();

        assert_eq!(
            decrements,
            vec![StockDecrement {
                product_id: 1,
                quantity: 3
            }]
        );
    }

    #[test]
    fn test_plan_decrements_insufficient_stock() {
        let priced = resolve_lines(
            &[requested(LineRef::Product(1), 5)],
            &[test_product(1, 1000, 3)],
            &[],
        )
        .unwrap();

        let err = plan_decrements(&priced, &[test_product(1, 1000, 3)]).unwrap_err();

        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                product_id: 1,
                requested: 5,
                available: 3,
            }
        ));
    }

    #[test]
    fn test_plan_decrements_exact_stock_passes() {
        let priced = resolve_lines(
            &[requested(LineRef::Product(1), 3)],
            &[test_product(1, 1000, 3)],
            &[],
        )
        .unwrap();

        let decrements = plan_decrements(&priced, &[test_product(1, 1000, 3)]).unwrap();
        assert_eq!(decrements.len(), 1);
    }

    #[test]
    fn test_plan_decrements_checks_lines_independently() {
        // Two lines for the same product each fit the read stock on their
        // own; the conditional decrement at write time is what catches the
        // combined overdraw.
        let priced = resolve_lines(
            &[
                requested(LineRef::Product(1), 1),
                requested(LineRef::Product(1), 1),
            ],
            &[test_product(1, 1000, 1)],
            &[],
        )
        .unwrap();

        let decrements = plan_decrements(&priced, &[test_product(1, 1000, 1)]).unwrap();
        assert_eq!(decrements.len(), 2);
    }

    #[test]
    fn test_requested_line_wire_format() {
        let json = serde_json::to_value(requested(LineRef::Product(3), 2)).unwrap();
        assert_eq!(json["kind"], "product");
        assert_eq!(json["itemId"], 3);
        assert_eq!(json["quantity"], 2);
    }
}
