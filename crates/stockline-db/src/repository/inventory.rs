//! # Inventory History Repository
//!
//! Append-only audit log of stock changes. This repository only inserts
//! and reads; triggers in the schema reject UPDATE and DELETE.

use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stockline_core::InventoryHistory;

/// Repository for inventory-history rows.
#[derive(Debug, Clone)]
pub struct InventoryHistoryRepository {
    pool: SqlitePool,
}

impl InventoryHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryHistoryRepository { pool }
    }

    pub async fn append<'e, E>(executor: E, entry: &InventoryHistory) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(
            product_id = %entry.product_id,
            quantity_changed = entry.quantity_changed,
            reference = %entry.reference,
            "Appending inventory history"
        );

        sqlx::query(
            r#"
            INSERT INTO inventory_history (
                id, product_id, quantity_changed, operation_type, reference, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.product_id)
        .bind(entry.quantity_changed)
        .bind(entry.operation_type)
        .bind(&entry.reference)
        .bind(&entry.notes)
        .bind(entry.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// A product's stock movements, newest first.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<InventoryHistory>> {
        let entries = sqlx::query_as::<_, InventoryHistory>(
            r#"
            SELECT id, product_id, quantity_changed, operation_type, reference, notes, created_at
            FROM inventory_history
            WHERE product_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Every movement written under one reference (e.g. `Sale-<id>`).
    pub async fn list_by_reference(&self, reference: &str) -> DbResult<Vec<InventoryHistory>> {
        let entries = sqlx::query_as::<_, InventoryHistory>(
            r#"
            SELECT id, product_id, quantity_changed, operation_type, reference, notes, created_at
            FROM inventory_history
            WHERE reference = ?1
            ORDER BY rowid
            "#,
        )
        .bind(reference)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Σ `quantity_changed` for a product; equals its current stock when
    /// every movement, including opening stock, went through the log.
    pub async fn net_change(&self, product_id: &str) -> DbResult<i64> {
        let net: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity_changed), 0) FROM inventory_history WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use stockline_core::TransactionType;

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query(
            "INSERT INTO categories (id, name, is_active, created_at, updated_at) \
             VALUES ('cat-1', 'General', 1, '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO products (id, barcode, name, category_id, purchase_price_cents, \
             sale_price_cents, current_stock, minimum_stock, is_active, created_at, updated_at) \
             VALUES ('p-1', '111', 'Rice 1kg', 'cat-1', 100, 200, 0, 0, 1, \
             '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        db
    }

    fn entry(id: &str, delta: i64, reference: &str) -> InventoryHistory {
        InventoryHistory {
            id: id.to_string(),
            product_id: "p-1".to_string(),
            quantity_changed: delta,
            operation_type: TransactionType::Adjustment,
            reference: reference.to_string(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_and_list() {
        let db = setup().await;
        InventoryHistoryRepository::append(db.pool(), &entry("h-1", 10, "Stock Adjustment"))
            .await
            .unwrap();
        InventoryHistoryRepository::append(db.pool(), &entry("h-2", -4, "Sale-abc"))
            .await
            .unwrap();

        let repo = db.inventory();
        assert_eq!(repo.list_for_product("p-1").await.unwrap().len(), 2);
        assert_eq!(repo.list_by_reference("Sale-abc").await.unwrap().len(), 1);
        assert_eq!(repo.net_change("p-1").await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_history_rejects_update_and_delete() {
        let db = setup().await;
        InventoryHistoryRepository::append(db.pool(), &entry("h-1", 1, "Stock Adjustment"))
            .await
            .unwrap();

        let update: DbError = sqlx::query("UPDATE inventory_history SET quantity_changed = 99")
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(update, DbError::ConstraintViolation { .. }));

        let delete: DbError = sqlx::query("DELETE FROM inventory_history")
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(delete, DbError::ConstraintViolation { .. }));
    }
}
