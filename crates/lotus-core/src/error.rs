//! # Domain Errors
//!
//! The two error enums raised by pure logic: [`ValidationError`] for input
//! checks and [`CoreError`] for domain rule violations. Each carries the
//! context a caller needs in its message (entity, id, quantities), and
//! each variant maps onto exactly one HTTP status at the edge. The
//! conversion chain runs `ValidationError` → `CoreError` →
//! `SaleCommitError` (lotus-db) → `ApiError` (the HTTP app), every hop
//! via `#[from]`.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// A domain rule rejected the operation.
///
/// Raised while assembling or committing a sale. The HTTP layer translates
/// these to client responses; nothing in this crate knows about status
/// codes.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The request is structurally or semantically invalid.
    ///
    /// ## When This Occurs
    /// - Empty line list on a sale commit
    /// - Quantity outside the allowed range
    /// - Unknown status token, missing customer id
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A referenced record does not exist.
    ///
    /// ## When This Occurs
    /// - Line references a product/service id with no catalog row
    /// - Customer or promotion id resolves to nothing
    /// - Sale lookup by an id that was never issued
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Stock cannot cover the requested quantity.
    ///
    /// ## When This Occurs
    /// - Read-time guard: requested exceeds the visible stock level
    /// - Write-time guard: the conditional decrement matched no row
    ///   because a concurrent sale drained stock first
    ///
    /// ## Commit Flow
    /// ```text
    /// plan_decrements (read guard)
    ///      │ pass
    ///      ▼
    /// UPDATE .. SET stock = stock - qty WHERE id = ? AND stock >= qty
    ///      │ rows_affected == 0
    ///      ▼
    /// InsufficientStock { product_id, requested, available }
    ///      │
    ///      ▼
    /// Whole transaction rolls back, nothing persisted
    /// ```
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    /// An input check failed before any domain logic ran.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Shorthand for the common not-found cases.
    pub const fn not_found(entity: &'static str, id: i64) -> Self {
        CoreError::NotFound { entity, id }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// An input failed the checks in [`crate::validation`].
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The field was absent or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// The field exceeds its length cap.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// The number falls outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Zero or negative where only positive works.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Result alias for domain operations.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = CoreError::InsufficientStock {
            product_id: 7,
            requested: 5,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: requested 5, available 3"
        );

        let err = CoreError::not_found("Customer", 42);
        assert_eq!(err.to_string(), "Customer not found: 42");
    }

    #[test]
    fn test_validation_messages_name_the_field() {
        let err = ValidationError::Required {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items is required");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 999,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 999");
    }

    #[test]
    fn test_validation_lifts_into_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "customerId".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
