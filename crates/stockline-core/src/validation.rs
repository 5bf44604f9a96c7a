//! # Validation Module
//!
//! Input validation for catalog, party and transaction payloads.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (form fields, quantity dialogs)                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - shape and range rules, no I/O                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Services inside a unit of work                               │
//! │  ├── Referenced category/supplier/customer exists                      │
//! │  ├── Barcode not taken                                                 │
//! │  └── Stock sufficient                                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: SQLite constraints (UNIQUE barcode, FKs, CHECK stock >= 0)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::{
    MAX_LINE_QUANTITY, MAX_PRICE_CENTS, MAX_STOCK_LEVEL, MAX_TRANSACTION_AMOUNT_CENTS,
    MAX_TRANSACTION_LINES,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a barcode.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits and hyphens only (EAN/UPC plus in-store codes)
///
/// ## Example
/// ```rust
/// use stockline_core::validation::validate_barcode;
///
/// assert!(validate_barcode("5449000000996").is_ok());
/// assert!(validate_barcode("INT-0042").is_ok());
/// assert!(validate_barcode("").is_err());
/// assert!(validate_barcode("has space").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    validate_text("barcode", barcode, 50)?;

    if !barcode
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters, digits and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name (1-200 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 200)
}

/// Validates a category name (1-100 characters).
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    validate_text("category name", name, 100)
}

/// Validates a customer or supplier name (1-200 characters).
pub fn validate_party_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 200)
}

/// Validates an optional free-text description (at most 500 characters).
pub fn validate_description(description: Option<&str>) -> ValidationResult<()> {
    match description {
        Some(text) if text.chars().count() > 500 => Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 500,
        }),
        _ => Ok(()),
    }
}

/// Validates a search query and returns it trimmed.
///
/// Empty is allowed (lists everything); at most 100 characters.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0); direction comes from the transaction type
/// - Must not exceed [`MAX_LINE_QUANTITY`]
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

/// Validates a price in cents (zero allowed for free items).
///
/// ## Example
/// ```rust
/// use stockline_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("sale price", 1099).is_ok());
/// assert!(validate_price_cents("sale price", 0).is_ok());
/// assert!(validate_price_cents("sale price", -100).is_err());
/// assert!(validate_price_cents("sale price", i64::MAX).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a signed amount (tendered cash, balance change, supplier
/// ledger entry) against [`MAX_TRANSACTION_AMOUNT_CENTS`] in either direction.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(-MAX_TRANSACTION_AMOUNT_CENTS..=MAX_TRANSACTION_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: -MAX_TRANSACTION_AMOUNT_CENTS,
            max: MAX_TRANSACTION_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates a line discount: between zero and the line's gross amount.
pub fn validate_discount_cents(discount_cents: i64, gross_cents: i64) -> ValidationResult<()> {
    if discount_cents < 0 || discount_cents > gross_cents.max(0) {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: gross_cents.max(0),
        });
    }

    Ok(())
}

/// Validates an opening or minimum stock level (0..=MAX_STOCK_LEVEL).
pub fn validate_stock_level(field: &str, level: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK_LEVEL).contains(&level) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_STOCK_LEVEL,
        });
    }

    Ok(())
}

/// Validates a manual stock adjustment delta (any sign, never zero,
/// magnitude at most [`MAX_STOCK_LEVEL`]).
pub fn validate_adjustment_delta(delta: i64) -> ValidationResult<()> {
    if delta == 0 {
        return Err(ValidationError::MustBeNonZero {
            field: "delta".to_string(),
        });
    }

    if delta.unsigned_abs() > MAX_STOCK_LEVEL as u64 {
        return Err(ValidationError::OutOfRange {
            field: "delta".to_string(),
            min: -MAX_STOCK_LEVEL,
            max: MAX_STOCK_LEVEL,
        });
    }

    Ok(())
}

/// Validates a customer debt payment amount (1..=MAX_TRANSACTION_AMOUNT_CENTS).
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    validate_amount_cents("payment amount", cents)
}

// =============================================================================
// Collection / Range Validators
// =============================================================================

/// Validates the number of lines on a proposed transaction.
pub fn validate_line_count(lines: usize) -> ValidationResult<()> {
    if lines == 0 {
        return Err(ValidationError::required("lines"));
    }

    if lines > MAX_TRANSACTION_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_TRANSACTION_LINES as i64,
        });
    }

    Ok(())
}

/// Validates an inclusive date range.
pub fn validate_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> ValidationResult<()> {
    if start > end {
        return Err(ValidationError::InvalidDateRange);
    }

    Ok(())
}

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use stockline_core::validation::validate_uuid;
///
/// assert!(validate_uuid("product id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("product id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
