//! # Category Repository
//!
//! Database operations for product categories.

use chrono::Utc;
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::escape_like;
use stockline_core::{Category, CategorySummary};

macro_rules! select_categories {
    ($tail:literal) => {
        concat!(
            "SELECT id, name, description, is_active, created_at, updated_at FROM categories ",
            $tail
        )
    };
}

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    // =========================================================================
    // Executor-generic (usable inside a UnitOfWork)
    // =========================================================================

    pub async fn fetch_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<Category>>
    where
        E: SqliteExecutor<'e>,
    {
        let category = sqlx::query_as::<_, Category>(select_categories!("WHERE id = ?1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(category)
    }

    pub async fn insert<'e, E>(executor: E, category: &Category) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Writes name, description and active flag.
    pub async fn update<'e, E>(executor: E, category: &Category) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id = %category.id, "Updating category");

        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = ?2,
                description = ?3,
                is_active = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.is_active)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", &category.id));
        }

        Ok(())
    }

    // =========================================================================
    // Pool queries
    // =========================================================================

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        Self::fetch_by_id(&self.pool, id).await
    }

    /// Active categories whose name contains `fragment` (case-insensitive).
    pub async fn find_by_name(&self, fragment: &str) -> DbResult<Vec<Category>> {
        let pattern = format!("%{}%", escape_like(fragment.trim()));

        let categories = sqlx::query_as::<_, Category>(select_categories!(
            "WHERE is_active = 1 AND name LIKE ?1 ESCAPE '\\' ORDER BY name"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn list_active(&self) -> DbResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>(select_categories!("WHERE is_active = 1 ORDER BY name"))
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    /// Active categories with the number of active products in each.
    pub async fn list_with_counts(&self) -> DbResult<Vec<CategorySummary>> {
        let summaries = sqlx::query_as::<_, CategorySummary>(
            r#"
            SELECT
                c.id,
                c.name,
                c.description,
                COUNT(p.id) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id AND p.is_active = 1
            WHERE c.is_active = 1
            GROUP BY c.id, c.name, c.description
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }

    /// Whether an active category with exactly this name exists.
    pub async fn exists_by_name(&self, name: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM categories WHERE is_active = 1 AND name = ?1 COLLATE NOCASE",
        )
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        debug!(id = %id, active, "Setting category active flag");

        let result =
            sqlx::query("UPDATE categories SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(active)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Counts active categories (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn category(id: &str, name: &str) -> Category {
        let now = Utc::now();
        Category {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CategoryRepository::insert(db.pool(), &category("c-1", "Electronics"))
            .await
            .unwrap();
        CategoryRepository::insert(db.pool(), &category("c-2", "Groceries"))
            .await
            .unwrap();

        let repo = db.categories();
        assert_eq!(repo.get_by_id("c-1").await.unwrap().unwrap().name, "Electronics");
        assert!(repo.get_by_id("missing").await.unwrap().is_none());

        let found = repo.find_by_name("elec").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(repo.exists_by_name("groceries").await.unwrap());
    }

    #[tokio::test]
    async fn test_deactivated_category_is_hidden() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CategoryRepository::insert(db.pool(), &category("c-1", "Seasonal"))
            .await
            .unwrap();

        let repo = db.categories();
        repo.set_active("c-1", false).await.unwrap();

        assert!(repo.list_active().await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(matches!(
            repo.set_active("nope", false).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_with_counts_empty_category() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CategoryRepository::insert(db.pool(), &category("c-1", "Empty"))
            .await
            .unwrap();

        let summaries = db.categories().list_with_counts().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].product_count, 0);
    }
}
