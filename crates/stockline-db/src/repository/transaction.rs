//! # Transaction Repository
//!
//! Transaction headers, their ordered lines, and the aggregate queries
//! behind reporting.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  transactions                         transaction_details               │
//! │  ┌──────────────────────────┐         ┌──────────────────────────────┐  │
//! │  │ id            (PK)       │ 1 ── N  │ transaction_id  (FK)         │  │
//! │  │ transaction_type         │         │ position        (0, 1, ...)  │  │
//! │  │ status                   │         │ product_id      (FK)         │  │
//! │  │ total / paid / balance   │         │ quantity, unit price         │  │
//! │  │ customer_id   (FK, opt)  │         │ purchase price snapshot      │  │
//! │  │ transaction_date         │         │ discount, line total         │  │
//! │  └──────────────────────────┘         └──────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockline_core::{
    Transaction, TransactionDetail, TransactionStatus, TransactionType, TransactionWithDetails,
};

macro_rules! select_transactions {
    ($tail:literal) => {
        concat!(
            "SELECT id, customer_id, transaction_type, status, total_cents, paid_cents, ",
            "balance_cents, transaction_date FROM transactions ",
            $tail
        )
    };
}

/// Repository for transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    // =========================================================================
    // Executor-generic (usable inside a UnitOfWork)
    // =========================================================================

    pub async fn insert<'e, E>(executor: E, txn: &Transaction) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(
            id = %txn.id,
            transaction_type = ?txn.transaction_type,
            total_cents = txn.total_cents,
            "Inserting transaction"
        );

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, customer_id, transaction_type, status,
                total_cents, paid_cents, balance_cents, transaction_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&txn.id)
        .bind(&txn.customer_id)
        .bind(txn.transaction_type)
        .bind(txn.status)
        .bind(txn.total_cents)
        .bind(txn.paid_cents)
        .bind(txn.balance_cents)
        .bind(txn.transaction_date)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn insert_detail<'e, E>(executor: E, detail: &TransactionDetail) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO transaction_details (
                id, transaction_id, position, product_id, quantity,
                unit_price_cents, purchase_price_cents, discount_cents, total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&detail.id)
        .bind(&detail.transaction_id)
        .bind(detail.position)
        .bind(&detail.product_id)
        .bind(detail.quantity)
        .bind(detail.unit_price_cents)
        .bind(detail.purchase_price_cents)
        .bind(detail.discount_cents)
        .bind(detail.total_cents)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn fetch_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<Transaction>>
    where
        E: SqliteExecutor<'e>,
    {
        let txn = sqlx::query_as::<_, Transaction>(select_transactions!("WHERE id = ?1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(txn)
    }

    /// Lines of a transaction in position order.
    pub async fn fetch_details<'e, E>(executor: E, transaction_id: &str) -> DbResult<Vec<TransactionDetail>>
    where
        E: SqliteExecutor<'e>,
    {
        let details = sqlx::query_as::<_, TransactionDetail>(
            r#"
            SELECT
                id, transaction_id, position, product_id, quantity,
                unit_price_cents, purchase_price_cents, discount_cents, total_cents
            FROM transaction_details
            WHERE transaction_id = ?1
            ORDER BY position
            "#,
        )
        .bind(transaction_id)
        .fetch_all(executor)
        .await?;

        Ok(details)
    }

    pub async fn set_status<'e, E>(executor: E, id: &str, status: TransactionStatus) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id = %id, status = ?status, "Updating transaction status");

        let result = sqlx::query("UPDATE transactions SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", id));
        }

        Ok(())
    }

    // =========================================================================
    // Pool queries
    // =========================================================================

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        Self::fetch_by_id(&self.pool, id).await
    }

    /// Header plus lines, or `None` if the header does not exist.
    pub async fn get_with_details(&self, id: &str) -> DbResult<Option<TransactionWithDetails>> {
        let Some(transaction) = Self::fetch_by_id(&self.pool, id).await? else {
            return Ok(None);
        };

        let details = Self::fetch_details(&self.pool, id).await?;

        Ok(Some(TransactionWithDetails {
            transaction,
            details,
        }))
    }

    /// A customer's transactions, newest first.
    pub async fn list_by_customer(&self, customer_id: &str) -> DbResult<Vec<Transaction>> {
        let txns = sqlx::query_as::<_, Transaction>(select_transactions!(
            "WHERE customer_id = ?1 ORDER BY transaction_date DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(txns)
    }

    pub async fn list_by_type(&self, kind: TransactionType) -> DbResult<Vec<Transaction>> {
        let txns = sqlx::query_as::<_, Transaction>(select_transactions!(
            "WHERE transaction_type = ?1 ORDER BY transaction_date DESC"
        ))
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(txns)
    }

    /// Completed transactions in `[start, end]`, newest first.
    pub async fn list_completed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Transaction>> {
        let txns = sqlx::query_as::<_, Transaction>(select_transactions!(
            r#"
            WHERE status = 'completed'
              AND transaction_date >= ?1
              AND transaction_date <= ?2
            ORDER BY transaction_date DESC
            "#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(txns)
    }

    /// The most recent completed transaction, if any.
    pub async fn last_completed(&self) -> DbResult<Option<Transaction>> {
        let txn = sqlx::query_as::<_, Transaction>(select_transactions!(
            "WHERE status = 'completed' ORDER BY transaction_date DESC, rowid DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(txn)
    }

    /// Completed debt payments for a customer: line-less sales with a
    /// negative balance.
    pub async fn list_payments(&self, customer_id: &str) -> DbResult<Vec<Transaction>> {
        let txns = sqlx::query_as::<_, Transaction>(select_transactions!(
            r#"
            WHERE customer_id = ?1
              AND transaction_type = 'sale'
              AND status = 'completed'
              AND total_cents = 0
              AND NOT EXISTS (
                  SELECT 1 FROM transaction_details d WHERE d.transaction_id = transactions.id
              )
            ORDER BY transaction_date DESC
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(txns)
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// Σ `total_cents` of completed transactions of `kind` in `[start, end]`.
    pub async fn sum_totals(
        &self,
        kind: Option<TransactionType>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_cents), 0)
            FROM transactions
            WHERE status = 'completed'
              AND (?1 IS NULL OR transaction_type = ?1)
              AND transaction_date >= ?2
              AND transaction_date <= ?3
            "#,
        )
        .bind(kind)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Σ purchase price × quantity over completed lines in `[start, end]`,
    /// with return lines counted negatively.
    pub async fn sum_cost(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<i64> {
        let cost: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(
                CASE WHEN t.transaction_type = 'return'
                     THEN -(d.purchase_price_cents * d.quantity)
                     ELSE d.purchase_price_cents * d.quantity
                END
            ), 0)
            FROM transaction_details d
            INNER JOIN transactions t ON t.id = d.transaction_id
            WHERE t.status = 'completed'
              AND t.transaction_date >= ?1
              AND t.transaction_date <= ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(cost)
    }
}
