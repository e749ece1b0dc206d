//! # Records and References
//!
//! The shapes the rest of the workspace passes around: catalog rows the
//! engine reads, sale rows it writes, and [`LineRef`] tying a line to
//! exactly one of the two sellable kinds.
//!
//! ## The Cast
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog (read by the engine)        Sale (written by the engine)      │
//! │  ┌─────────────┐ ┌─────────────┐     ┌─────────────┐ ┌─────────────┐   │
//! │  │   Product   │ │ ServiceItem │     │    Sale     │ │  SaleItem   │   │
//! │  │  price      │ │   price     │     │  invoice    │ │  LineRef    │   │
//! │  │  stock      │ │  (no stock) │     │  totals     │ │  snapshot   │   │
//! │  └─────────────┘ └─────────────┘     └─────────────┘ └─────────────┘   │
//! │  ┌─────────────┐ ┌─────────────┐     ┌─────────────┐ ┌─────────────┐   │
//! │  │  Customer   │ │  Promotion  │     │ SaleStatus  │ │    Role     │   │
//! │  │  phone      │ │  window     │     │ UNPAID/PAID │ │ ADMIN/EMPL  │   │
//! │  └─────────────┘ └─────────────┘     │ /TRANSFER   │ └─────────────┘   │
//! │                                      └─────────────┘                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All record ids are `i64` (database rowids). All money fields are cents.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::SALE_VISIBILITY_WINDOW_HOURS;

// =============================================================================
// Line Reference
// =============================================================================

/// A reference to the thing a sale line is for: a product or a service.
///
/// ## Why an enum, not two nullable ids?
/// The persistent layout keeps two nullable FK columns, but in code the
/// "exactly one of product_id/service_id" invariant is structural - a
/// `LineRef` cannot reference both or neither.
///
/// ## Wire format
/// Serializes adjacently tagged, so a flattened line reads naturally:
/// `{"kind": "product", "itemId": 3}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "itemId", rename_all = "lowercase")]
pub enum LineRef {
    Product(i64),
    Service(i64),
}

impl LineRef {
    /// The discriminator as it appears on the wire.
    pub const fn kind(&self) -> &'static str {
        match self {
            LineRef::Product(_) => "product",
            LineRef::Service(_) => "service",
        }
    }

    /// The referenced catalog id.
    pub const fn item_id(&self) -> i64 {
        match self {
            LineRef::Product(id) | LineRef::Service(id) => *id,
        }
    }

    /// Synthetic line id, unique across kinds ("product-3", "service-3").
    pub fn line_id(&self) -> String {
        format!("{}-{}", self.kind(), self.item_id())
    }

    pub const fn product_id(&self) -> Option<i64> {
        match self {
            LineRef::Product(id) => Some(*id),
            LineRef::Service(_) => None,
        }
    }

    pub const fn service_id(&self) -> Option<i64> {
        match self {
            LineRef::Service(id) => Some(*id),
            LineRef::Product(_) => None,
        }
    }

    pub const fn is_product(&self) -> bool {
        matches!(self, LineRef::Product(_))
    }

    /// Rebuilds a reference from the two nullable columns of a stored row.
    ///
    /// Returns `None` when the row violates the exactly-one invariant
    /// (both set or both null); the storage CHECK constraint makes that
    /// unreachable for rows this system wrote.
    pub const fn from_columns(product_id: Option<i64>, service_id: Option<i64>) -> Option<Self> {
        match (product_id, service_id) {
            (Some(id), None) => Some(LineRef::Product(id)),
            (None, Some(id)) => Some(LineRef::Service(id)),
            _ => None,
        }
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// Payment status of a committed sale.
///
/// Set once at commit time (defaults to `Unpaid`); there is no transition
/// machinery beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum SaleStatus {
    Unpaid,
    Paid,
    Transfer,
}

impl SaleStatus {
    /// Parses a status token case-insensitively ("paid" == "PAID").
    pub fn parse(s: &str) -> Option<SaleStatus> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNPAID" => Some(SaleStatus::Unpaid),
            "PAID" => Some(SaleStatus::Paid),
            "TRANSFER" => Some(SaleStatus::Transfer),
            _ => None,
        }
    }

    /// The uppercase token stored in the database and sent on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Unpaid => "UNPAID",
            SaleStatus::Paid => "PAID",
            SaleStatus::Transfer => "TRANSFER",
        }
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Unpaid
    }
}

// =============================================================================
// Role
// =============================================================================

/// Actor role attached to an authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    /// Parses a role token case-insensitively.
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "EMPLOYEE" => Some(Role::Employee),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Employee => "EMPLOYEE",
        }
    }

    /// Visibility policy for sale listings.
    ///
    /// Returns the earliest `created_at` this role may see, or `None` for
    /// unrestricted access. Employees are limited to the trailing
    /// [`SALE_VISIBILITY_WINDOW_HOURS`]; admins see everything. This scopes
    /// queries only - older sales still exist and stay reachable by
    /// privileged roles.
    pub fn sale_visibility_cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Role::Admin => None,
            Role::Employee => Some(now - Duration::hours(SALE_VISIBILITY_WINDOW_HOURS)),
        }
    }
}

// =============================================================================
// Catalog Records
// =============================================================================

/// A product with tracked inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Sale price in cents.
    pub price_cents: i64,
    /// Acquisition cost in cents (margin reporting only).
    pub cost_price_cents: i64,
    /// Current stock level. Mutated exclusively by the sale commit
    /// transaction (and explicit restocks).
    pub stock: i64,
    /// Low-stock threshold; read-only to the sale engine.
    pub min_stock: i64,
    pub category_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether current stock covers a requested quantity.
    #[inline]
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }

    /// Low-stock classification (stock at or below the threshold).
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

/// A service offering. Priced like a product but never stock-limited.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A customer record. Sales require one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Unique per customer; part of the sale search surface.
    pub phone: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A time-windowed discount rule.
///
/// `discount_value` is stored in hundredths: basis points for percent
/// promotions (1000 = 10%), cents for flat ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: i64,
    pub name: String,
    pub discount_value: i64,
    pub is_percent: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Promotion {
    /// Whether the promotion grants a discount at the given instant.
    ///
    /// Ineffective promotions never fail a sale; they contribute zero
    /// discount.
    pub fn is_effective_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }
}

/// A cashier/operator account. Only `id` and `name` ever leave the system
/// through the sale reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale Records
// =============================================================================

/// A committed sale. Immutable after creation.
///
/// The persisted totals are always server-computed inside the commit
/// transaction; client-submitted amounts are never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: i64,
    /// Human-readable, unique: INV<YY><MM><DD><4-digit-suffix>.
    pub invoice_number: String,
    pub customer_id: i64,
    /// The committing cashier.
    pub user_id: i64,
    pub promotion_id: Option<i64>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub status: SaleStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One priced line within a committed sale.
///
/// `unit_price_cents` is a snapshot taken at commit time; later catalog
/// price changes never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    #[serde(flatten)]
    pub line: LineRef,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl SaleItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn promo(active: bool, start_offset_h: i64, end_offset_h: i64) -> Promotion {
        let now = Utc::now();
        Promotion {
            id: 1,
            name: "Test".to_string(),
            discount_value: 1000,
            is_percent: true,
            start_date: now + Duration::hours(start_offset_h),
            end_date: now + Duration::hours(end_offset_h),
            is_active: active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_line_ref_exclusivity() {
        let product = LineRef::Product(3);
        assert_eq!(product.product_id(), Some(3));
        assert_eq!(product.service_id(), None);
        assert_eq!(product.line_id(), "product-3");

        let service = LineRef::Service(3);
        assert_eq!(service.service_id(), Some(3));
        assert_eq!(service.product_id(), None);
        assert_eq!(service.line_id(), "service-3");

        // Same numeric id, distinct lines
        assert_ne!(product, service);
    }

    #[test]
    fn test_line_ref_from_columns() {
        assert_eq!(
            LineRef::from_columns(Some(5), None),
            Some(LineRef::Product(5))
        );
        assert_eq!(
            LineRef::from_columns(None, Some(7)),
            Some(LineRef::Service(7))
        );
        assert_eq!(LineRef::from_columns(Some(5), Some(7)), None);
        assert_eq!(LineRef::from_columns(None, None), None);
    }

    #[test]
    fn test_line_ref_wire_format() {
        let json = serde_json::to_value(LineRef::Product(3)).unwrap();
        assert_eq!(json["kind"], "product");
        assert_eq!(json["itemId"], 3);

        let back: LineRef =
            serde_json::from_value(serde_json::json!({"kind": "service", "itemId": 9})).unwrap();
        assert_eq!(back, LineRef::Service(9));
    }

    #[test]
    fn test_sale_status_parse() {
        assert_eq!(SaleStatus::parse("PAID"), Some(SaleStatus::Paid));
        assert_eq!(SaleStatus::parse("paid"), Some(SaleStatus::Paid));
        assert_eq!(SaleStatus::parse(" transfer "), Some(SaleStatus::Transfer));
        assert_eq!(SaleStatus::parse("refunded"), None);
        assert_eq!(SaleStatus::default(), SaleStatus::Unpaid);
    }

    #[test]
    fn test_role_visibility_cutoff() {
        let now = Utc::now();

        assert_eq!(Role::Admin.sale_visibility_cutoff(now), None);

        let cutoff = Role::Employee.sale_visibility_cutoff(now).unwrap();
        assert_eq!(now - cutoff, Duration::hours(24));
    }

    #[test]
    fn test_promotion_effectiveness() {
        let now = Utc::now();

        assert!(promo(true, -1, 1).is_effective_at(now));
        // Disabled
        assert!(!promo(false, -1, 1).is_effective_at(now));
        // Expired
        assert!(!promo(true, -3, -1).is_effective_at(now));
        // Not started yet
        assert!(!promo(true, 1, 3).is_effective_at(now));
    }

    #[test]
    fn test_product_stock_helpers() {
        let now = Utc::now();
        let product = Product {
            id: 1,
            name: "Paracetamol".to_string(),
            description: None,
            price_cents: 1500,
            cost_price_cents: 900,
            stock: 5,
            min_stock: 5,
            category_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        assert!(product.can_fulfill(5));
        assert!(!product.can_fulfill(6));
        assert!(product.is_low_stock());
    }
}
