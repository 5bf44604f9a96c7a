//! # Transaction Service
//!
//! Sale and refund processing, plus transaction lookups.
//!
//! ## process_sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate shape (lines, quantities, prices, discounts)    no I/O      │
//! │       │                                                                 │
//! │  BEGIN                                                                  │
//! │       ├── customer exists?                     → CustomerNotFound      │
//! │       ├── every product exists?                → ProductNotFound       │
//! │       ├── stock ≥ Σ requested per product?     → InsufficientStock     │
//! │       ├── INSERT transactions (Completed, totals from lines)           │
//! │       ├── INSERT transaction_details (position 0..n)                   │
//! │       ├── per line: stock −= qty, history "Sale-<id>"                  │
//! │       └── customer.balance += total − paid                             │
//! │  COMMIT                                         any error → ROLLBACK   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `process_refund` is the same pipeline with type Return: no stock
//! check, negative line totals, stock += qty and history "Return-<id>".
//! Refunds are not matched against an earlier sale.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::customer::CustomerRepository;
use crate::repository::inventory::InventoryHistoryRepository;
use crate::repository::product::{generate_id, ProductRepository};
use crate::repository::transaction::TransactionRepository;
use crate::service::{ServiceError, ServiceResult};
use crate::unit_of_work::UnitOfWork;
use stockline_core::transaction::{
    apply_stock_delta, ensure_stock, line_total, requested_quantities, stock_delta,
    validate_new_transaction, Totals,
};
use stockline_core::validation::validate_date_range;
use stockline_core::{
    CoreError, InventoryHistory, NewTransaction, NewTransactionLine, Product, Transaction,
    TransactionDetail, TransactionStatus, TransactionType, TransactionWithDetails,
};

#[derive(Debug, Clone)]
pub struct TransactionService {
    db: Database,
}

impl TransactionService {
    pub fn new(db: Database) -> Self {
        TransactionService { db }
    }

    // =========================================================================
    // Processing
    // =========================================================================

    /// Processes a sale atomically.
    ///
    /// ## Returns
    /// * `Ok(TransactionWithDetails)` - the stored header and lines
    /// * `Err(InsufficientStock)` - a product is short; nothing was written
    pub async fn process_sale(&self, input: NewTransaction) -> ServiceResult<TransactionWithDetails> {
        self.process(TransactionType::Sale, input).await
    }

    /// Processes a customer return atomically.
    ///
    /// `paid_cents` is what the till hands back, as a negative amount. A full
    /// cash refund (`paid == total`) leaves the customer balance alone; a
    /// store-credit refund (`paid == 0`) lowers it by the refund value.
    pub async fn process_refund(&self, input: NewTransaction) -> ServiceResult<TransactionWithDetails> {
        self.process(TransactionType::Return, input).await
    }

    async fn process(
        &self,
        kind: TransactionType,
        input: NewTransaction,
    ) -> ServiceResult<TransactionWithDetails> {
        validate_new_transaction(&input)?;

        let customer_id = input
            .customer_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        debug!(
            kind = ?kind,
            lines = input.lines.len(),
            customer_id = ?customer_id,
            "Processing transaction"
        );

        let mut uow = self.db.begin().await?;
        let result = Self::apply(
            &mut uow,
            kind,
            customer_id.as_deref(),
            input.paid_cents,
            &input.lines,
        )
        .await;
        let saved = uow.finish(result).await?;

        info!(
            id = %saved.transaction.id,
            kind = ?kind,
            total_cents = saved.transaction.total_cents,
            balance_cents = saved.transaction.balance_cents,
            "Transaction completed"
        );
        Ok(saved)
    }

    async fn apply(
        uow: &mut UnitOfWork,
        kind: TransactionType,
        customer_id: Option<&str>,
        paid_cents: i64,
        lines: &[NewTransactionLine],
    ) -> ServiceResult<TransactionWithDetails> {
        if let Some(customer_id) = customer_id {
            if CustomerRepository::fetch_by_id(uow.conn(), customer_id)
                .await?
                .is_none()
            {
                return Err(CoreError::CustomerNotFound(customer_id.to_string()).into());
            }
        }

        let products = Self::load_products(uow, kind, lines).await?;

        let transaction_id = generate_id();
        let now = Utc::now();

        let mut details = Vec::with_capacity(lines.len());
        for (position, line) in lines.iter().enumerate() {
            let product = products
                .get(&line.product_id)
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            details.push(TransactionDetail {
                id: generate_id(),
                transaction_id: transaction_id.clone(),
                position: position as i64,
                product_id: product.id.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                purchase_price_cents: product.purchase_price_cents,
                discount_cents: line.discount_cents,
                total_cents: line_total(kind, line).cents(),
            });
        }

        let totals = Totals::from_lines(
            details.iter().map(|d| d.line_total()),
            stockline_core::Money::from_cents(paid_cents),
        );

        let transaction = Transaction {
            id: transaction_id,
            customer_id: customer_id.map(str::to_string),
            transaction_type: kind,
            status: TransactionStatus::Completed,
            total_cents: totals.total.cents(),
            paid_cents: totals.paid.cents(),
            balance_cents: totals.balance.cents(),
            transaction_date: now,
        };

        TransactionRepository::insert(uow.conn(), &transaction).await?;

        let reference = transaction.inventory_reference();
        for detail in &details {
            TransactionRepository::insert_detail(uow.conn(), detail).await?;

            let delta = stock_delta(kind, detail.quantity);
            ProductRepository::apply_stock_delta(uow.conn(), &detail.product_id, delta).await?;

            let entry = InventoryHistory {
                id: generate_id(),
                product_id: detail.product_id.clone(),
                quantity_changed: delta,
                operation_type: kind,
                reference: reference.clone(),
                notes: None,
                created_at: now,
            };
            InventoryHistoryRepository::append(uow.conn(), &entry).await?;
        }

        if let Some(customer_id) = customer_id {
            if transaction.balance_cents != 0 {
                CustomerRepository::add_to_balance(uow.conn(), customer_id, transaction.balance_cents)
                    .await?;
            }
        }

        Ok(TransactionWithDetails {
            transaction,
            details,
        })
    }

    /// Loads every referenced product once and checks the stock level each
    /// product would reach, using the total quantity across all lines.
    async fn load_products(
        uow: &mut UnitOfWork,
        kind: TransactionType,
        lines: &[NewTransactionLine],
    ) -> ServiceResult<HashMap<String, Product>> {
        let mut products = HashMap::new();

        for (product_id, requested) in requested_quantities(lines) {
            let product = ProductRepository::fetch_by_id(uow.conn(), &product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(product_id.clone()))?;

            match kind {
                TransactionType::Sale => ensure_stock(&product, requested)?,
                _ => {
                    apply_stock_delta(&product, stock_delta(kind, requested))?;
                }
            }

            products.insert(product_id, product);
        }

        Ok(products)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets a transaction with its lines.
    pub async fn get_transaction(&self, id: &str) -> ServiceResult<TransactionWithDetails> {
        self.db
            .transactions()
            .get_with_details(id)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()).into())
    }

    pub async fn list_by_customer(&self, customer_id: &str) -> ServiceResult<Vec<Transaction>> {
        Ok(self.db.transactions().list_by_customer(customer_id).await?)
    }

    pub async fn list_by_type(&self, kind: TransactionType) -> ServiceResult<Vec<Transaction>> {
        Ok(self.db.transactions().list_by_type(kind).await?)
    }

    /// Completed transactions in `[start, end]`, newest first.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<Vec<Transaction>> {
        validate_date_range(start, end)?;
        Ok(self.db.transactions().list_completed_between(start, end).await?)
    }

    pub async fn last_completed(&self) -> ServiceResult<Option<Transaction>> {
        Ok(self.db.transactions().last_completed().await?)
    }

    /// Changes a transaction's status. Stock and balances are not touched.
    pub async fn update_status(&self, id: &str, status: TransactionStatus) -> ServiceResult<Transaction> {
        TransactionRepository::set_status(self.db.pool(), id, status)
            .await
            .map_err(|e| match e {
                DbError::NotFound { .. } => {
                    ServiceError::from(CoreError::TransactionNotFound(id.to_string()))
                }
                other => other.into(),
            })?;

        info!(id = %id, status = ?status, "Transaction status updated");

        self.db
            .transactions()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()).into())
    }
}
