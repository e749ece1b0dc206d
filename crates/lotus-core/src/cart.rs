//! # Cart Model
//!
//! The in-progress cart and its derived totals.
//!
//! ## Ownership
//! A [`Cart`] is a plain value owned by one session or request context and
//! passed by reference. There is no process-wide cart; callers that share a
//! cart across tasks wrap it in their own synchronization.
//!
//! ## Operation Walkthrough
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       One Cart, Checkout to Clear                       │
//! │                                                                         │
//! │  Caller Action            Cart Method              State Change         │
//! │  ─────────────            ───────────              ────────────         │
//! │                                                                         │
//! │  Pick product ───────────► add_product() ────────► line qty += 1        │
//! │                                (ceiling checked against product.stock)  │
//! │  Pick service ───────────► add_service() ────────► line qty += 1        │
//! │                                                                         │
//! │  Change quantity ────────► update_quantity() ────► qty = n (0 removes)  │
//! │                                                                         │
//! │  Remove line ────────────► remove_item() ────────► line dropped         │
//! │                                                                         │
//! │  Select promotion ───────► set_promotion() ──────► promotion replaced   │
//! │                                                                         │
//! │  Checkout ───────────────► export_for_commit() ──► immutable snapshot   │
//! │                                                                         │
//! │  Committed ──────────────► clear() ──────────────► lines + promo reset  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals Are Advisory
//! The cart's subtotal/discount/total exist for display. The commit
//! transaction recomputes all monetary amounts from authoritative catalog
//! prices and re-checks the promotion window; client-held numbers are never
//! persisted.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::pricing::{promotion_discount_cents, RequestedLine};
use crate::types::{LineRef, Product, Promotion, ServiceItem};
use crate::validation::{validate_cart_size, validate_quantity};

// =============================================================================
// Cart Line
// =============================================================================

/// One line in the cart.
///
/// ## Design Notes
/// - `id` is synthetic ("product-3", "service-3") so a product and service
///   with the same numeric id stay distinct lines
/// - `unit_price_cents` is snapshotted when the line is created; later
///   catalog price changes do not reprice lines already in the cart
/// - `stock_ceiling` caps the quantity for product lines and is absent for
///   services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Synthetic line id (kind + item id).
    pub id: String,

    /// What this line references.
    #[serde(flatten)]
    pub line: LineRef,

    /// Display name at time of adding (frozen).
    pub name: String,

    /// Price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Quantity in cart.
    pub quantity: i64,

    /// Quantity cap from the product's stock level; `None` for services.
    pub stock_ceiling: Option<i64>,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        let line = LineRef::Product(product.id);
        CartLine {
            id: line.line_id(),
            line,
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity: 1,
            stock_ceiling: Some(product.stock),
        }
    }

    fn from_service(service: &ServiceItem) -> Self {
        let line = LineRef::Service(service.id);
        CartLine {
            id: line.line_id(),
            line,
            name: service.name.clone(),
            unit_price_cents: service.price_cents,
            quantity: 1,
            stock_ceiling: None,
        }
    }

    /// Line total, always recomputed (unit price × quantity).
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart aggregate.
///
/// ## Invariants
/// - Lines are unique by synthetic id (re-adding increments quantity)
/// - Quantity is always 1..=MAX_LINE_QUANTITY (0 removes the line)
/// - Product quantities never exceed the line's stock ceiling
/// - Totals are derived on every read, never cached
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
    promotion: Option<Promotion>,
}

impl Cart {
    /// An empty cart with no promotion selected.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds one unit of a product, or increments an existing line.
    ///
    /// ## Behavior
    /// - Existing line: quantity + 1, refused with `InsufficientStock` when
    ///   that would exceed the product's current stock
    /// - New line: created with quantity 1; a product with zero stock is
    ///   refused outright
    ///
    /// The ceiling is refreshed from the product record on every add, so a
    /// restock picked up by the caller widens the cap.
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.line == LineRef::Product(product.id))
        {
            let new_qty = line.quantity + 1;
            validate_quantity(new_qty)?;
            if new_qty > product.stock {
                return Err(CoreError::InsufficientStock {
                    product_id: product.id,
                    requested: new_qty,
                    available: product.stock,
                });
            }
            line.quantity = new_qty;
            line.stock_ceiling = Some(product.stock);
            return Ok(());
        }

        if product.stock < 1 {
            return Err(CoreError::InsufficientStock {
                product_id: product.id,
                requested: 1,
                available: product.stock,
            });
        }

        validate_cart_size(self.lines.len())?;
        self.lines.push(CartLine::from_product(product));
        Ok(())
    }

    /// Adds one unit of a service, or increments an existing line.
    ///
    /// Services carry no stock ceiling; only the quantity cap and cart size
    /// limit apply.
    pub fn add_service(&mut self, service: &ServiceItem) -> CoreResult<()> {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.line == LineRef::Service(service.id))
        {
            let new_qty = line.quantity + 1;
            validate_quantity(new_qty)?;
            line.quantity = new_qty;
            return Ok(());
        }

        validate_cart_size(self.lines.len())?;
        self.lines.push(CartLine::from_service(service));
        Ok(())
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - `qty <= 0` removes the line
    /// - Exceeding the stock ceiling fails with `InsufficientStock`, leaving
    ///   the line unchanged
    /// - An unknown line id is a no-op
    pub fn update_quantity(&mut self, line_id: &str, qty: i64) -> CoreResult<()> {
        if qty <= 0 {
            self.remove_item(line_id);
            return Ok(());
        }

        validate_quantity(qty)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.id == line_id) {
            if let Some(ceiling) = line.stock_ceiling {
                if qty > ceiling {
                    return Err(CoreError::InsufficientStock {
                        product_id: line.line.item_id(),
                        requested: qty,
                        available: ceiling,
                    });
                }
            }
            line.quantity = qty;
        }

        Ok(())
    }

    /// Removes a line by synthetic id. No-op when absent.
    pub fn remove_item(&mut self, line_id: &str) {
        self.lines.retain(|l| l.id != line_id);
    }

    /// Replaces the active promotion unconditionally.
    ///
    /// No window or enabled check happens here; the commit step re-validates
    /// and an ineffective promotion commits at zero discount.
    pub fn set_promotion(&mut self, promotion: Option<Promotion>) {
        self.promotion = promotion;
    }

    /// Clears all lines and the promotion. Used after a successful commit.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.promotion = None;
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn promotion(&self) -> Option<&Promotion> {
        self.promotion.as_ref()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Subtotal before discount.
    pub fn subtotal_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total_cents()).sum()
    }

    /// Discount from the selected promotion's arithmetic.
    ///
    /// This is the display preview; whether the promotion is actually in
    /// window is decided at commit time with the commit clock.
    pub fn discount_cents(&self) -> i64 {
        match &self.promotion {
            Some(promo) => promotion_discount_cents(
                self.subtotal_cents(),
                promo.discount_value,
                promo.is_percent,
            ),
            None => 0,
        }
    }

    /// Grand total, floored at zero.
    pub fn total_cents(&self) -> i64 {
        (self.subtotal_cents() - self.discount_cents()).max(0)
    }

    /// Produces the immutable snapshot submitted at checkout.
    pub fn export_for_commit(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            subtotal_cents: self.subtotal_cents(),
            discount_cents: self.discount_cents(),
            total_cents: self.total_cents(),
            promotion_id: self.promotion.as_ref().map(|p| p.id),
        }
    }
}

// =============================================================================
// Cart Snapshot
// =============================================================================

/// Immutable checkout payload produced by [`Cart::export_for_commit`].
///
/// The monetary fields are advisory display hints. The commit transaction
/// recomputes every amount from catalog prices and persists only its own
/// numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub promotion_id: Option<i64>,
}

impl CartSnapshot {
    /// The line references and quantities the pricing resolver consumes.
    pub fn requested_lines(&self) -> Vec<RequestedLine> {
        self.lines
            .iter()
            .map(|l| RequestedLine {
                line: l.line,
                quantity: l.quantity,
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
