//! # Unit of Work
//!
//! One SQLite transaction that a service drives through several
//! repositories before committing or rolling back as a whole.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.begin()  ──► BEGIN                                                 │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  repo fns take uow.conn()   (same connection, same transaction)        │
//! │      │                                                                  │
//! │      ├── Ok  ──► finish() ──► COMMIT   ──► value returned              │
//! │      └── Err ──► finish() ──► ROLLBACK ──► error returned unchanged    │
//! │                                                                         │
//! │  Dropped without finish(): sqlx rolls back on drop.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

/// An open database transaction.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork").finish_non_exhaustive()
    }
}

impl UnitOfWork {
    /// Acquires a connection from `pool` and issues `BEGIN`.
    pub async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work started");
        Ok(UnitOfWork { tx })
    }

    /// The transaction's connection, usable as a sqlx executor.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work committed");
        Ok(())
    }

    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work rolled back");
        Ok(())
    }

    /// Commits on `Ok`, rolls back on `Err`.
    ///
    /// The original error is returned even if the rollback itself fails;
    /// the rollback failure is only logged.
    pub async fn finish<T, E>(self, result: Result<T, E>) -> Result<T, E>
    where
        E: From<DbError> + std::fmt::Display,
    {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "Rolling back unit of work");
                if let Err(rollback_err) = self.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    async fn count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn insert_category(conn: &mut sqlx::SqliteConnection, id: &str) {
        sqlx::query(
            "INSERT INTO categories (id, name, is_active, created_at, updated_at) \
             VALUES (?1, 'Test', 1, '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')",
        )
        .bind(id)
        .execute(conn)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_commit_persists() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        insert_category(uow.conn(), "c-1").await;
        uow.commit().await.unwrap();

        assert_eq!(count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_finish_err_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        insert_category(uow.conn(), "c-1").await;
        let result: Result<(), crate::DbError> =
            uow.finish(Err(crate::DbError::not_found("Thing", "x"))).await;

        assert!(result.is_err());
        assert_eq!(count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        {
            let mut uow = db.begin().await.unwrap();
            insert_category(uow.conn(), "c-1").await;
        }

        assert_eq!(count(&db).await, 0);
    }
}
