//! # stockline-core: Pure Business Logic for Stockline
//!
//! This crate contains the domain model of the point-of-sale and inventory
//! back end as plain types and pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockline Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Caller (UI, CLI, tests)                         │   │
//! │  │   process_sale, process_refund, adjust_stock, create_product    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockline-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │   money   │  │ transaction │  │validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ line totals │  │  rules   │  │   │
//! │  │   │  Customer │  │           │  │ stock check │  │  checks  │  │   │
//! │  │   └───────────┘  └───────────┘  └─────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               stockline-db (Database Layer)                     │   │
//! │  │      SQLite queries, migrations, unit of work, services         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Transaction, etc.)
//! - [`dto`] - Create/update payloads, proposed transactions, reports
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`transaction`] - Line totals, transaction totals, stock requirements
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockline_core::money::Money;
//!
//! let unit_price = Money::from_cents(1099); // $10.99
//! let line = unit_price.multiply_quantity(3) - Money::from_cents(97);
//! assert_eq!(line.cents(), 3200);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dto;
pub mod error;
pub mod money;
pub mod transaction;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use dto::*;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single transaction.
///
/// ## Business Reason
/// Prevents runaway tickets and keeps a single unit of work small.
pub const MAX_TRANSACTION_LINES: usize = 200;

/// Maximum quantity of a single product on one line.
///
/// ## Business Reason
/// Catches typing mistakes at the till (1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Highest unit price accepted, in cents (100,000,000.00).
///
/// ## Business Reason
/// Keeps `price × quantity` and the sum of a full ticket inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;

/// Largest single amount a transaction, payment or balance change may carry.
pub const MAX_TRANSACTION_AMOUNT_CENTS: i64 =
    MAX_PRICE_CENTS * MAX_LINE_QUANTITY * MAX_TRANSACTION_LINES as i64;

/// Highest stock level a product may reach.
pub const MAX_STOCK_LEVEL: i64 = 1_000_000_000;

/// Inventory-history reference used for manual stock adjustments.
pub const STOCK_ADJUSTMENT_REFERENCE: &str = "Stock Adjustment";

/// Categories every new database starts with.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("General", "General items"),
    ("Electronics", "Electronic items"),
    ("Groceries", "Grocery items"),
];
