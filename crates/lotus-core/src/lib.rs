//! # lotus-core: Pure Business Logic for Lotus POS
//!
//! This crate is the heart of the sale transaction engine. Every pricing,
//! cart, and stock decision is made here, as pure functions with zero I/O
//! dependencies. The database layer (`lotus-db`) feeds it rows and applies
//! its decisions inside a transaction; the HTTP layer never computes money.
//!
//! ## Where This Crate Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Lotus POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     apps/api (axum)                             │   │
//! │  │     POST /api/sales ─── GET /api/sales/:id ─── GET /api/sales  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 lotus-db (commit transaction)                   │   │
//! │  │     fetch rows in-tx ──► decide (THIS CRATE) ──► write in-tx   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lotus-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  pricing  │  │   │
//! │  │   │  LineRef  │  │   Money   │  │   Cart    │  │  resolve  │  │   │
//! │  │   │  Product  │  │  percent  │  │ CartLine  │  │  totals   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Map
//!
//! - [`types`] - shared domain records and the product-or-service line reference
//! - [`money`] - cents-backed [`Money`] with half-up percentage math
//! - [`cart`] - in-memory cart whose totals are recomputed on every read
//! - [`pricing`] - price resolution, promotion discounts, stock decrement planning
//! - [`error`] - [`CoreError`](error::CoreError) and validation failures
//! - [`validation`] - range and presence checks for request input
//!
//! ## Design Rules
//!
//! 1. **Pure functions**: same input, same output; `Utc::now()` is never
//!    read inside this crate - callers pass the instant in
//! 2. **Integer money**: all monetary values are cents (i64), never floats
//! 3. **Explicit errors**: typed errors, never strings or panics
//! 4. **Structural exclusivity**: a line references a product OR a service
//!    through [`types::LineRef`], so "exactly one of the two" cannot be
//!    violated by construction

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine, CartSnapshot};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{PricedLine, RequestedLine, SaleTotals, StockDecrement};
pub use types::*;

// =============================================================================
// Limits
// =============================================================================

/// Maximum quantity of a single line in a cart or sale request.
///
/// Guards against fat-finger quantities (1000 instead of 10). Stock
/// ceilings are usually far below this anyway.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum number of lines in a single cart or sale request.
pub const MAX_CART_LINES: usize = 100;

/// How far back a non-privileged cashier can see committed sales, in hours.
///
/// Listing applies this as a `created_at` lower bound for the EMPLOYEE
/// role. It scopes visibility only; the rows themselves are permanent.
pub const SALE_VISIBILITY_WINDOW_HOURS: i64 = 24;
