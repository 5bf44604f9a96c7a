//! # Customer Repository
//!
//! Database operations for customers and their running balances.
//!
//! A positive balance means the customer owes the store. Balances only
//! move by delta (`balance_cents = balance_cents + ?`) so concurrent
//! units of work never overwrite each other's change.

use chrono::Utc;
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::escape_like;
use stockline_core::Customer;

macro_rules! select_customers {
    ($tail:literal) => {
        concat!(
            "SELECT id, name, phone, email, address, balance_cents, is_active, created_at, updated_at ",
            "FROM customers ",
            $tail
        )
    };
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    // =========================================================================
    // Executor-generic (usable inside a UnitOfWork)
    // =========================================================================

    pub async fn fetch_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<Customer>>
    where
        E: SqliteExecutor<'e>,
    {
        let customer = sqlx::query_as::<_, Customer>(select_customers!("WHERE id = ?1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(customer)
    }

    pub async fn insert<'e, E>(executor: E, customer: &Customer) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, phone, email, address,
                balance_cents, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.balance_cents)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Writes contact fields and the active flag. The balance is left alone.
    pub async fn update<'e, E>(executor: E, customer: &Customer) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                phone = ?3,
                email = ?4,
                address = ?5,
                is_active = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.is_active)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Adds a signed amount to the customer's balance.
    pub async fn add_to_balance<'e, E>(executor: E, id: &str, delta_cents: i64) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id = %id, delta_cents, "Adjusting customer balance");

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET balance_cents = balance_cents + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta_cents)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    // =========================================================================
    // Pool queries
    // =========================================================================

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        Self::fetch_by_id(&self.pool, id).await
    }

    /// Active customers whose name contains `fragment`.
    pub async fn search_by_name(&self, fragment: &str) -> DbResult<Vec<Customer>> {
        let pattern = format!("%{}%", escape_like(fragment.trim()));

        let customers = sqlx::query_as::<_, Customer>(select_customers!(
            "WHERE is_active = 1 AND name LIKE ?1 ESCAPE '\\' ORDER BY name"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn list_active(&self) -> DbResult<Vec<Customer>> {
        let customers =
            sqlx::query_as::<_, Customer>(select_customers!("WHERE is_active = 1 ORDER BY name"))
                .fetch_all(&self.pool)
                .await?;

        Ok(customers)
    }

    /// Customers who owe money, largest debt first.
    pub async fn list_debtors(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(select_customers!(
            "WHERE is_active = 1 AND balance_cents > 0 ORDER BY balance_cents DESC, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }
}
