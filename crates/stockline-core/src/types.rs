//! # Domain Types
//!
//! Entities persisted by stockline-db and returned to callers.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐      ┌──────────────┐      ┌──────────────┐          │
//! │  │   Category   │◄─────│   Product    │─────►│   Supplier   │          │
//! │  │              │  1:N │ barcode (UQ) │ N:0..1│ balance      │          │
//! │  └──────────────┘      │ current_stock│      └──────┬───────┘          │
//! │                        └──────┬───────┘             │ 1:N               │
//! │                               │                     ▼                   │
//! │           ┌───────────────────┼──────────┐   SupplierTransaction        │
//! │           ▼                   ▼          │                              │
//! │  TransactionDetail     InventoryHistory  │   (append-only)              │
//! │  (ordered lines)       (append-only)     │                              │
//! │           │                              │                              │
//! │           ▼ N:1                          │                              │
//! │  ┌──────────────┐      ┌──────────────┐  │                              │
//! │  │ Transaction  │─────►│   Customer   │  │                              │
//! │  │ type, status │ N:0..1│ balance      │  │                              │
//! │  └──────────────┘      └──────────────┘                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity is keyed by a UUID v4 string. Money columns are cents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Transaction Type / Status
// =============================================================================

/// What a transaction does to stock and balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Goods leave the store; stock decreases.
    Sale,
    /// Goods come back from a customer; stock increases.
    Return,
    /// Goods received from a supplier.
    Purchase,
    /// Manual stock correction.
    Adjustment,
}

impl TransactionType {
    /// Prefix used in inventory-history references (`Sale-<id>`).
    pub const fn reference_prefix(&self) -> &'static str {
        match self {
            TransactionType::Sale => "Sale",
            TransactionType::Return => "Return",
            TransactionType::Purchase => "Purchase",
            TransactionType::Adjustment => "Adjustment",
        }
    }

    /// Builds the inventory-history reference for a transaction id.
    pub fn reference_for(&self, transaction_id: &str) -> String {
        format!("{}-{}", self.reference_prefix(), transaction_id)
    }
}

/// Lifecycle of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A category together with the number of active products in it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub product_count: i64,
}

// =============================================================================
// Parties
// =============================================================================

/// A supplier with a running balance (positive = we owe them).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub balance_cents: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

/// Kind of a supplier ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SupplierTransactionKind {
    /// Goods bought on account (usually a positive amount).
    Purchase,
    /// Money paid to the supplier (usually a negative amount).
    Payment,
}

/// Append-only supplier ledger entry; `amount_cents` is added to the balance.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SupplierTransaction {
    pub id: String,
    pub supplier_id: String,
    pub kind: SupplierTransactionKind,
    pub amount_cents: i64,
    pub reference: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub transaction_date: DateTime<Utc>,
}

/// A customer with a running balance (positive = customer owes the store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub balance_cents: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }

    /// A debtor is a customer who owes the store money.
    #[inline]
    pub fn is_debtor(&self) -> bool {
        self.balance_cents > 0
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog item with its stock level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,

    /// Scanned barcode; unique across the catalog.
    pub barcode: String,

    pub name: String,
    pub description: Option<String>,
    pub category_id: String,
    pub supplier_id: Option<String>,

    /// What the store pays per unit.
    pub purchase_price_cents: i64,

    /// What the customer pays per unit.
    pub sale_price_cents: i64,

    pub current_stock: i64,

    /// Reorder threshold; at or below this the product is "low stock".
    pub minimum_stock: i64,

    /// Soft-delete flag.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Margin per unit at current prices.
    #[inline]
    pub fn unit_margin(&self) -> Money {
        self.sale_price() - self.purchase_price()
    }

    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.minimum_stock
    }

    /// Whether `quantity` units can leave the shelf.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.current_stock >= quantity
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// Transaction header.
///
/// `total_cents` is the sum of the line totals and
/// `balance_cents = total_cents - paid_cents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub customer_id: Option<String>,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub balance_cents: i64,
    #[ts(as = "String")]
    pub transaction_date: DateTime<Utc>,
}

impl Transaction {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_cents)
    }

    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }

    /// Reference written to inventory history for this transaction's lines.
    pub fn inventory_reference(&self) -> String {
        self.transaction_type.reference_for(&self.id)
    }
}

/// One ordered line of a transaction.
///
/// Price fields are snapshots taken when the transaction was processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionDetail {
    pub id: String,
    pub transaction_id: String,
    /// Zero-based line order.
    pub position: i64,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub purchase_price_cents: i64,
    pub discount_cents: i64,
    /// `quantity × unit_price − discount`, negated for returns.
    pub total_cents: i64,
}

impl TransactionDetail {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Cost of goods on this line at the snapshotted purchase price.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.purchase_price_cents).multiply_quantity(self.quantity)
    }
}

/// A transaction header with its lines in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionWithDetails {
    pub transaction: Transaction,
    pub details: Vec<TransactionDetail>,
}

// =============================================================================
// Inventory History
// =============================================================================

/// Append-only record of a stock change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryHistory {
    pub id: String,
    pub product_id: String,
    /// Signed stock delta (negative for sales).
    pub quantity_changed: i64,
    pub operation_type: TransactionType,
    /// `Sale-<id>`, `Return-<id>` or `Stock Adjustment`.
    pub reference: String,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
