//! # Input Validation
//!
//! Range and presence checks shared by the cart and the commit path.
//!
//! These run after the HTTP layer has already deserialized and
//! authenticated the request, and before any business logic or SQL. The
//! database constraints (NOT NULL, UNIQUE, `CHECK (stock >= 0)`) remain as
//! a backstop behind them; a request that passes here can still lose a
//! race and fail at the store.

use crate::error::ValidationError;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

/// Result alias for the validators below.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks a line quantity: positive and at most [`MAX_LINE_QUANTITY`].
///
/// ```rust
/// use lotus_core::validation::validate_quantity;
///
/// assert!(validate_quantity(5).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(1000).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Checks a price: non-negative, zero allowed for free items.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Checks a record id. Rowids start at 1, so anything below that never
/// matches a row and is rejected before a query runs.
pub fn validate_entity_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Trims a search term and caps it at 100 characters. An empty term is
/// fine; it means "no filter".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Checks there is room for one more cart line ([`MAX_CART_LINES`] cap).
pub fn validate_cart_size(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart lines".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_price_allows_zero_rejects_negative() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_entity_id_must_reference_a_row() {
        assert!(validate_entity_id("customerId", 1).is_ok());
        assert!(validate_entity_id("customerId", 0).is_err());
        assert!(validate_entity_id("promotionId", -5).is_err());
    }

    #[test]
    fn test_search_query_trims_and_caps() {
        assert_eq!(validate_search_query("  INV2501  ").unwrap(), "INV2501");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"a".repeat(200)).is_err());
    }

    #[test]
    fn test_cart_size_cap() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_LINES - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_LINES).is_err());
    }
}
