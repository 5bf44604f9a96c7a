//! # Supplier Repository
//!
//! Suppliers, their running balance, and the append-only supplier ledger.
//!
//! ## Balance Flow
//! ```text
//! supplier_transactions (append-only)        suppliers.balance_cents
//! ┌──────────┬──────────┬──────────────┐
//! │ purchase │  +12000  │ INV-0042     │ ──► 0 + 12000       = 12000
//! │ payment  │   -5000  │ bank xfer    │ ──► 12000 - 5000    =  7000
//! └──────────┴──────────┴──────────────┘
//! ```
//! A positive balance means the store owes the supplier.

use chrono::Utc;
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::escape_like;
use stockline_core::{Supplier, SupplierTransaction};

macro_rules! select_suppliers {
    ($tail:literal) => {
        concat!(
            "SELECT id, name, contact_person, phone, email, address, balance_cents, ",
            "is_active, created_at, updated_at FROM suppliers ",
            $tail
        )
    };
}

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    // =========================================================================
    // Executor-generic (usable inside a UnitOfWork)
    // =========================================================================

    pub async fn fetch_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<Supplier>>
    where
        E: SqliteExecutor<'e>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(select_suppliers!("WHERE id = ?1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(supplier)
    }

    pub async fn insert<'e, E>(executor: E, supplier: &Supplier) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id = %supplier.id, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, name, contact_person, phone, email, address,
                balance_cents, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(supplier.balance_cents)
        .bind(supplier.is_active)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Writes contact fields and the active flag. The balance is left alone.
    pub async fn update<'e, E>(executor: E, supplier: &Supplier) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id = %supplier.id, "Updating supplier");

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?2,
                contact_person = ?3,
                phone = ?4,
                email = ?5,
                address = ?6,
                is_active = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(supplier.is_active)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", &supplier.id));
        }

        Ok(())
    }

    /// Adds a signed amount to the supplier's balance.
    pub async fn add_to_balance<'e, E>(executor: E, id: &str, delta_cents: i64) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id = %id, delta_cents, "Adjusting supplier balance");

        let result = sqlx::query(
            "UPDATE suppliers SET balance_cents = balance_cents + ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(delta_cents)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }

    /// Appends a ledger entry. There is no update or delete counterpart.
    pub async fn insert_transaction<'e, E>(executor: E, entry: &SupplierTransaction) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id = %entry.id, supplier_id = %entry.supplier_id, "Appending supplier transaction");

        sqlx::query(
            r#"
            INSERT INTO supplier_transactions (
                id, supplier_id, kind, amount_cents, reference, notes, transaction_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.supplier_id)
        .bind(entry.kind)
        .bind(entry.amount_cents)
        .bind(&entry.reference)
        .bind(&entry.notes)
        .bind(entry.transaction_date)
        .execute(executor)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Pool queries
    // =========================================================================

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        Self::fetch_by_id(&self.pool, id).await
    }

    pub async fn search_by_name(&self, fragment: &str) -> DbResult<Vec<Supplier>> {
        let pattern = format!("%{}%", escape_like(fragment.trim()));

        let suppliers = sqlx::query_as::<_, Supplier>(select_suppliers!(
            "WHERE is_active = 1 AND name LIKE ?1 ESCAPE '\\' ORDER BY name"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    pub async fn list_active(&self) -> DbResult<Vec<Supplier>> {
        let suppliers =
            sqlx::query_as::<_, Supplier>(select_suppliers!("WHERE is_active = 1 ORDER BY name"))
                .fetch_all(&self.pool)
                .await?;

        Ok(suppliers)
    }

    /// Suppliers the store still owes money to, largest balance first.
    pub async fn list_with_outstanding_balance(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(select_suppliers!(
            "WHERE is_active = 1 AND balance_cents > 0 ORDER BY balance_cents DESC, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// A supplier's ledger, newest first.
    pub async fn list_transactions(&self, supplier_id: &str) -> DbResult<Vec<SupplierTransaction>> {
        let entries = sqlx::query_as::<_, SupplierTransaction>(
            r#"
            SELECT id, supplier_id, kind, amount_cents, reference, notes, transaction_date
            FROM supplier_transactions
            WHERE supplier_id = ?1
            ORDER BY transaction_date DESC, rowid DESC
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
