//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Search-as-you-type over name and barcode
//! - CRUD operations, soft delete
//! - Stock updates by delta
//! - Low-stock listing
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  User types: "cab"                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  name LIKE '%cab%'  OR  barcode LIKE 'cab%'                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  exact barcode hits first, then by name                                │
//! │                                                                         │
//! │  USB-C Cable 1m   | 5901234123457                                      │
//! │  HDMI Cable 2m    | 5901234123464                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::escape_like;
use stockline_core::Product;

macro_rules! select_products {
    ($tail:literal) => {
        concat!(
            "SELECT id, barcode, name, description, category_id, supplier_id, ",
            "purchase_price_cents, sale_price_cents, current_stock, minimum_stock, ",
            "is_active, created_at, updated_at FROM products ",
            $tail
        )
    };
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let results = repo.search("cable", 20).await?;
///
/// // inside a unit of work
/// let product = ProductRepository::fetch_by_id(uow.conn(), &id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // Executor-generic (usable inside a UnitOfWork)
    // =========================================================================

    /// Gets a product by ID, active or not.
    pub async fn fetch_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<Product>>
    where
        E: SqliteExecutor<'e>,
    {
        let product = sqlx::query_as::<_, Product>(select_products!("WHERE id = ?1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(product)
    }

    /// ID of the product holding `barcode`, including soft-deleted ones
    /// (the UNIQUE index covers every row).
    pub async fn barcode_owner<'e, E>(executor: E, barcode: &str) -> DbResult<Option<String>>
    where
        E: SqliteExecutor<'e>,
    {
        let id: Option<String> = sqlx::query_scalar("SELECT id FROM products WHERE barcode = ?1")
            .bind(barcode)
            .fetch_optional(executor)
            .await?;

        Ok(id)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - barcode already exists
    /// * `Err(DbError::ForeignKeyViolation)` - unknown category or supplier
    pub async fn insert<'e, E>(executor: E, product: &Product) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(barcode = %product.barcode, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, barcode, name, description, category_id, supplier_id,
                purchase_price_cents, sale_price_cents, current_stock, minimum_stock,
                is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12, ?13
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(product.purchase_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.current_stock)
        .bind(product.minimum_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Updates catalog fields. `current_stock` is never written here; stock
    /// moves only through [`ProductRepository::apply_stock_delta`].
    pub async fn update<'e, E>(executor: E, product: &Product) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                barcode = ?2,
                name = ?3,
                description = ?4,
                category_id = ?5,
                supplier_id = ?6,
                purchase_price_cents = ?7,
                sale_price_cents = ?8,
                minimum_stock = ?9,
                is_active = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(product.purchase_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.minimum_stock)
        .bind(product.is_active)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Updates product stock by a signed delta.
    ///
    /// ```text
    /// UPDATE products SET current_stock = current_stock - 3
    /// ```
    /// The `CHECK (current_stock >= 0)` constraint is the last line of
    /// defence; services check sufficiency before calling this.
    pub async fn apply_stock_delta<'e, E>(executor: E, id: &str, delta: i64) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id = %id, delta = %delta, "Updating stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET current_stock = current_stock + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    // =========================================================================
    // Pool queries
    // =========================================================================

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        Self::fetch_by_id(&self.pool, id).await
    }

    /// Gets an active product by its barcode (the scanner path).
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(select_products!(
            "WHERE barcode = ?1 AND is_active = 1"
        ))
        .bind(barcode.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Searches active products by name fragment or barcode prefix.
    ///
    /// An empty query lists active products by name.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let escaped = escape_like(query);
        let contains = format!("%{}%", escaped);
        let prefix = format!("{}%", escaped);

        let products = sqlx::query_as::<_, Product>(select_products!(
            r#"
            WHERE is_active = 1
              AND (name LIKE ?1 ESCAPE '\' OR barcode LIKE ?2 ESCAPE '\')
            ORDER BY CASE WHEN barcode = ?3 THEN 0 ELSE 1 END, name
            LIMIT ?4
            "#
        ))
        .bind(contains)
        .bind(prefix)
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Active products ordered by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(select_products!(
            "WHERE is_active = 1 ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn list_by_category(&self, category_id: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(select_products!(
            "WHERE is_active = 1 AND category_id = ?1 ORDER BY name"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Active products at or below their minimum stock, emptiest first.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(select_products!(
            "WHERE is_active = 1 AND current_stock <= minimum_stock ORDER BY current_stock, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Historical transaction lines still reference it.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Number of transaction lines plus inventory-history rows that
    /// reference the product.
    pub async fn movement_count(&self, id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*) FROM transaction_details WHERE product_id = ?1)
              + (SELECT COUNT(*) FROM inventory_history WHERE product_id = ?1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Removes the row. Fails with a foreign-key violation if anything
    /// still references the product.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::category::CategoryRepository;
    use stockline_core::Category;

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let category = Category {
            id: "cat-1".to_string(),
            name: "Electronics".to_string(),
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        CategoryRepository::insert(db.pool(), &category).await.unwrap();
        db
    }

    fn product(id: &str, barcode: &str, name: &str, stock: i64, minimum: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            barcode: barcode.to_string(),
            name: name.to_string(),
            description: None,
            category_id: "cat-1".to_string(),
            supplier_id: None,
            purchase_price_cents: 400,
            sale_price_cents: 999,
            current_stock: stock,
            minimum_stock: minimum,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_by_barcode() {
        let db = setup().await;
        let p = product("p-1", "5901234123457", "USB-C Cable 1m", 10, 2);
        ProductRepository::insert(db.pool(), &p).await.unwrap();

        let stored = db
            .products()
            .get_by_barcode("5901234123457")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, p.name);
        assert_eq!(stored.current_stock, 10);
        assert_eq!(stored.sale_price_cents, 999);
    }

    #[tokio::test]
    async fn test_duplicate_barcode_is_unique_violation() {
        let db = setup().await;
        ProductRepository::insert(db.pool(), &product("p-1", "111", "A", 0, 0))
            .await
            .unwrap();
        let err = ProductRepository::insert(db.pool(), &product("p-2", "111", "B", 0, 0))
            .await
            .unwrap_err();
        assert!(err.is_barcode_conflict());
    }

    #[tokio::test]
    async fn test_stock_delta_and_check_constraint() {
        let db = setup().await;
        ProductRepository::insert(db.pool(), &product("p-1", "111", "A", 5, 0))
            .await
            .unwrap();

        ProductRepository::apply_stock_delta(db.pool(), "p-1", -3)
            .await
            .unwrap();
        let stored = db.products().get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(stored.current_stock, 2);

        let err = ProductRepository::apply_stock_delta(db.pool(), "p-1", -3)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));
    }

    #[tokio::test]
    async fn test_search_and_low_stock() {
        let db = setup().await;
        for p in [
            product("p-1", "5901", "USB-C Cable 1m", 10, 2),
            product("p-2", "5902", "HDMI Cable 2m", 1, 3),
            product("p-3", "7700", "Mouse", 0, 0),
        ] {
            ProductRepository::insert(db.pool(), &p).await.unwrap();
        }

        let repo = db.products();
        assert_eq!(repo.search("cable", 20).await.unwrap().len(), 2);
        assert_eq!(repo.search("59", 20).await.unwrap().len(), 2);
        assert_eq!(repo.search("", 20).await.unwrap().len(), 3);

        let low = repo.list_low_stock().await.unwrap();
        let ids: Vec<_> = low.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p-3", "p-2"]);
    }

    #[tokio::test]
    async fn test_search_wildcards_match_literally() {
        let db = setup().await;
        for p in [
            product("p-1", "5901", "Tape 50% off", 4, 0),
            product("p-2", "5902", "Tape_roll", 4, 0),
            product("p-3", "5903", "Tapeworm", 4, 0),
        ] {
            ProductRepository::insert(db.pool(), &p).await.unwrap();
        }

        let repo = db.products();
        let found = repo.search("%", 20).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "p-1");

        let found = repo.search("tape_", 20).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "p-2");

        assert_eq!(repo.search("tape", 20).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_barcode_lookup() {
        let db = setup().await;
        ProductRepository::insert(db.pool(), &product("p-1", "111", "A", 0, 0))
            .await
            .unwrap();

        let repo = db.products();
        repo.soft_delete("p-1").await.unwrap();

        assert!(repo.get_by_barcode("111").await.unwrap().is_none());
        assert!(repo.get_by_id("p-1").await.unwrap().is_some());
        assert_eq!(
            ProductRepository::barcode_owner(db.pool(), "111")
                .await
                .unwrap()
                .as_deref(),
            Some("p-1")
        );
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
