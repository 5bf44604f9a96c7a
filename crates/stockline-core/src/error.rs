//! # Error Types
//!
//! Domain-specific error types for stockline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockline-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockline-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - What callers see (code + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → caller dialog      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, id, quantities)
//! 3. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// The `Display` text of each variant is the message the caller surfaces
/// to the user unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Category referenced by a product does not exist.
    #[error("Selected category does not exist: {0}")]
    CategoryNotFound(String),

    /// Supplier referenced by a product or supplier transaction does not exist.
    #[error("Selected supplier does not exist: {0}")]
    SupplierNotFound(String),

    /// Customer cannot be found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Transaction cannot be found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Insufficient stock to complete a sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Sale line: "USB Cable" × 5
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "USB Cable", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Dialog: "Insufficient stock for product: USB Cable (available 3, requested 5)"
    /// ```
    #[error("Insufficient stock for product: {product} (available {available}, requested {requested})")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A stock adjustment would leave the product below zero.
    #[error("Operation would result in negative stock for {product}: current {current}, change {delta}")]
    NegativeStock {
        product: String,
        current: i64,
        delta: i64,
    },

    /// Another product already uses this barcode.
    #[error("A product with barcode '{0}' already exists")]
    DuplicateBarcode(String),

    /// Product still referenced by transaction lines or inventory history.
    #[error("Product {0} has transaction or inventory history and cannot be deleted")]
    ProductInUse(String),

    /// Transaction has more lines than allowed.
    #[error("Transaction cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// Amount is invalid for the requested operation.
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be zero.
    #[error("{field} must not be zero")]
    MustBeNonZero { field: String },

    /// Invalid format (e.g., invalid UUID, invalid barcode characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Date range where the end precedes the start.
    #[error("start date must not be after end date")]
    InvalidDateRange,
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_names_product() {
        let err = CoreError::InsufficientStock {
            product: "USB Cable".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product: USB Cable (available 3, requested 5)"
        );
    }

    #[test]
    fn test_negative_stock_message() {
        let err = CoreError::NegativeStock {
            product: "Rice 5kg".to_string(),
            current: 2,
            delta: -3,
        };
        assert!(err.to_string().contains("negative stock"));
        assert!(err.to_string().contains("Rice 5kg"));
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");

        let err = ValidationError::MustBeNonZero {
            field: "delta".to_string(),
        };
        assert_eq!(err.to_string(), "delta must not be zero");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("barcode").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
