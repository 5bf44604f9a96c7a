//! # Input and Report Types
//!
//! What callers hand to the services (create/update payloads, proposed
//! transactions) and what the reporting helpers hand back.
//!
//! Inputs carry no ids or timestamps; the data layer assigns those.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::SupplierTransactionKind;

// =============================================================================
// Catalog Inputs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewProduct {
    pub barcode: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: String,
    pub supplier_id: Option<String>,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    /// Opening stock; recorded as the product's first inventory movement.
    pub initial_stock: i64,
    pub minimum_stock: i64,
}

/// Editable product fields. Stock only moves through adjustments and
/// transactions, so it is not part of an update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductUpdate {
    pub barcode: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: String,
    pub supplier_id: Option<String>,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    pub minimum_stock: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// Party Inputs
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerInput {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SupplierInput {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewSupplierTransaction {
    pub supplier_id: String,
    pub kind: SupplierTransactionKind,
    /// Signed amount added to the supplier balance.
    pub amount_cents: i64,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Transaction Inputs
// =============================================================================

/// A proposed sale or return.
///
/// The processor decides the type and status and computes every total
/// from `lines`; only `paid_cents` is taken from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewTransaction {
    pub customer_id: Option<String>,
    /// Amount tendered. For returns, cash handed back is negative.
    pub paid_cents: i64,
    pub lines: Vec<NewTransactionLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewTransactionLine {
    pub product_id: String,
    /// Always positive; direction comes from the transaction type.
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_cents: i64,
}

impl NewTransactionLine {
    /// A line at `unit_price_cents` with no discount.
    pub fn new(product_id: impl Into<String>, quantity: i64, unit_price_cents: i64) -> Self {
        NewTransactionLine {
            product_id: product_id.into(),
            quantity,
            unit_price_cents,
            discount_cents: 0,
        }
    }

    pub fn with_discount(mut self, discount_cents: i64) -> Self {
        self.discount_cents = discount_cents;
        self
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Gross profit over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfitReport {
    #[ts(as = "String")]
    pub start: DateTime<Utc>,
    #[ts(as = "String")]
    pub end: DateTime<Utc>,
    pub total_sales_cents: i64,
    pub total_cost_cents: i64,
    pub gross_profit_cents: i64,
}

impl ProfitReport {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, sales: Money, cost: Money) -> Self {
        ProfitReport {
            start,
            end,
            total_sales_cents: sales.cents(),
            total_cost_cents: cost.cents(),
            gross_profit_cents: (sales - cost).cents(),
        }
    }

    #[inline]
    pub fn gross_profit(&self) -> Money {
        Money::from_cents(self.gross_profit_cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit_report_math() {
        let now = Utc::now();
        let report = ProfitReport::new(now, now, Money::from_cents(10_000), Money::from_cents(6_500));
        assert_eq!(report.gross_profit().cents(), 3_500);
    }

    #[test]
    fn test_line_builder() {
        let line = NewTransactionLine::new("p-1", 2, 450).with_discount(100);
        assert_eq!(line.quantity, 2);
        assert_eq!(line.discount_cents, 100);
    }

    #[test]
    fn test_new_transaction_camel_case() {
        let json = r#"{"customerId":null,"paidCents":500,"lines":[]}"#;
        let txn: NewTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.paid_cents, 500);
        assert!(txn.lines.is_empty());
    }
}
