//! # Transaction Math
//!
//! Pure rules behind sale and return processing: line totals, header
//! totals, stock direction and stock sufficiency.
//!
//! ## Sign Conventions
//! ```text
//! ┌──────────────┬────────────────────┬─────────────────┬─────────────────┐
//! │ Type         │ line total         │ stock delta     │ balance         │
//! ├──────────────┼────────────────────┼─────────────────┼─────────────────┤
//! │ Sale         │ +(qty×price − disc)│ −qty            │ total − paid    │
//! │ Return       │ −(qty×price − disc)│ +qty            │ total − paid    │
//! │ Purchase     │ +(qty×price − disc)│ +qty            │ total − paid    │
//! │ Adjustment   │ n/a                │ caller's delta  │ n/a             │
//! └──────────────┴────────────────────┴─────────────────┴─────────────────┘
//! ```
//!
//! For a return, `paid` is what left the till: a full cash refund has
//! `paid == total` (both negative) and leaves the customer balance alone.

use std::collections::HashMap;

use crate::dto::{NewTransaction, NewTransactionLine};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, TransactionType};
use crate::validation::{
    validate_amount_cents, validate_discount_cents, validate_line_count, validate_price_cents,
    validate_quantity,
};

/// Header amounts derived from a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub total: Money,
    pub paid: Money,
    pub balance: Money,
}

impl Totals {
    /// Totals for a set of line totals and the caller's payment.
    pub fn from_lines<I>(line_totals: I, paid: Money) -> Self
    where
        I: IntoIterator<Item = Money>,
    {
        let total: Money = line_totals.into_iter().sum();
        Totals {
            total,
            paid,
            balance: total - paid,
        }
    }
}

/// Line total: `quantity × unit price − discount`, negated for returns.
///
/// ## Example
/// ```rust
/// use stockline_core::transaction::line_total;
/// use stockline_core::{NewTransactionLine, TransactionType};
///
/// let line = NewTransactionLine::new("p", 3, 250).with_discount(50);
/// assert_eq!(line_total(TransactionType::Sale, &line).cents(), 700);
/// assert_eq!(line_total(TransactionType::Return, &line).cents(), -700);
/// ```
pub fn line_total(kind: TransactionType, line: &NewTransactionLine) -> Money {
    let net = Money::from_cents(line.unit_price_cents).multiply_quantity(line.quantity)
        - Money::from_cents(line.discount_cents);

    match kind {
        TransactionType::Return => -net,
        _ => net,
    }
}

/// Signed stock movement for `quantity` units on a line of `kind`.
pub fn stock_delta(kind: TransactionType, quantity: i64) -> i64 {
    match kind {
        TransactionType::Sale => -quantity,
        TransactionType::Return | TransactionType::Purchase | TransactionType::Adjustment => {
            quantity
        }
    }
}

/// Checks the shape of a proposed sale or return before any I/O.
///
/// ## Rules
/// - 1..=MAX_TRANSACTION_LINES lines
/// - each quantity positive and within limits
/// - prices within 0..=MAX_PRICE_CENTS, discount between zero and the line's gross
/// - tendered amount within ±MAX_TRANSACTION_AMOUNT_CENTS
///
/// With these bounds every line total and the ticket total fit in `i64`.
pub fn validate_new_transaction(txn: &NewTransaction) -> CoreResult<()> {
    validate_line_count(txn.lines.len()).map_err(|e| match e {
        crate::ValidationError::OutOfRange { .. } => CoreError::TooManyLines {
            max: crate::MAX_TRANSACTION_LINES,
        },
        other => other.into(),
    })?;

    for line in &txn.lines {
        if line.product_id.trim().is_empty() {
            return Err(crate::ValidationError::required("product").into());
        }
        validate_quantity(line.quantity)?;
        validate_price_cents("unit price", line.unit_price_cents)?;
        let gross = line.unit_price_cents * line.quantity;
        validate_discount_cents(line.discount_cents, gross)?;
    }

    validate_amount_cents("paid amount", txn.paid_cents)?;

    Ok(())
}

/// Total requested quantity per product, in first-seen order.
///
/// Two lines for the same product must be checked against stock together.
pub fn requested_quantities(lines: &[NewTransactionLine]) -> Vec<(String, i64)> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<&str, i64> = HashMap::new();

    for line in lines {
        let entry = totals.entry(line.product_id.as_str()).or_insert_with(|| {
            order.push(line.product_id.clone());
            0
        });
        *entry += line.quantity;
    }

    order
        .into_iter()
        .map(|id| {
            let qty = totals.get(id.as_str()).copied().unwrap_or_default();
            (id, qty)
        })
        .collect()
}

/// Fails with `InsufficientStock` naming the product when `requested`
/// exceeds its current stock.
pub fn ensure_stock(product: &Product, requested: i64) -> CoreResult<()> {
    if product.can_sell(requested) {
        Ok(())
    } else {
        Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: product.current_stock,
            requested,
        })
    }
}

/// Returns the stock level after applying `delta`.
///
/// Fails with `NegativeStock` below zero and `InvalidAmount` above
/// [`MAX_STOCK_LEVEL`](crate::MAX_STOCK_LEVEL).
pub fn apply_stock_delta(product: &Product, delta: i64) -> CoreResult<i64> {
    let next = product
        .current_stock
        .checked_add(delta)
        .filter(|next| *next <= crate::MAX_STOCK_LEVEL)
        .ok_or_else(|| CoreError::InvalidAmount {
            reason: format!(
                "stock of {} would exceed {}",
                product.name,
                crate::MAX_STOCK_LEVEL
            ),
        })?;

    if next < 0 {
        return Err(CoreError::NegativeStock {
            product: product.name.clone(),
            current: product.current_stock,
            delta,
        });
    }
    Ok(next)
}

// =============================================================================
// Unit Tests
// =============================================================================
