//! # Repository Module
//!
//! Database repository implementations for Stockline.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Reads outside a unit of work          Writes inside a unit of work    │
//! │  ────────────────────────────          ────────────────────────────    │
//! │  db.products().search("cab", 20)       let mut uow = db.begin().await? │
//! │       │                                ProductRepository::             │
//! │       │ &SqlitePool                      apply_stock_delta(            │
//! │       ▼                                    uow.conn(), id, -2)         │
//! │  any pooled connection                      │ &mut SqliteConnection    │
//! │                                             ▼                          │
//! │                                        the unit's connection           │
//! │                                                                         │
//! │  Same SQL either way: the executor-generic fns take                    │
//! │  `E: SqliteExecutor<'e>`.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository)
//! - [`SupplierRepository`](supplier::SupplierRepository) - suppliers and their ledger
//! - [`CustomerRepository`](customer::CustomerRepository)
//! - [`ProductRepository`](product::ProductRepository) - catalog, search, stock
//! - [`TransactionRepository`](transaction::TransactionRepository) - headers, lines, aggregates
//! - [`InventoryHistoryRepository`](inventory::InventoryHistoryRepository) - append-only log

pub mod category;
pub mod customer;
pub mod inventory;
pub mod product;
pub mod supplier;
pub mod transaction;

/// Escapes `\`, `%` and `_` so user text matches literally in a
/// `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
