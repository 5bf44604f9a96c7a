//! # Inventory Service
//!
//! Manual stock adjustments and the stock audit trail.
//!
//! ## adjust_stock
//! ```text
//! BEGIN
//!   product = SELECT ... WHERE id = ?          missing  → ProductNotFound
//!   next    = current_stock + delta            next < 0 → NegativeStock
//!   UPDATE products SET current_stock = current_stock + delta
//!   INSERT inventory_history (delta, 'adjustment', 'Stock Adjustment', notes)
//! COMMIT                                       any error → ROLLBACK
//! ```

use chrono::Utc;
use tracing::info;

use crate::pool::Database;
use crate::repository::inventory::InventoryHistoryRepository;
use crate::repository::product::{generate_id, ProductRepository};
use crate::service::ServiceResult;
use crate::unit_of_work::UnitOfWork;
use stockline_core::transaction::apply_stock_delta;
use stockline_core::validation::validate_adjustment_delta;
use stockline_core::{
    CoreError, InventoryHistory, Product, TransactionType, STOCK_ADJUSTMENT_REFERENCE,
};

#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
}

impl InventoryService {
    pub fn new(db: Database) -> Self {
        InventoryService { db }
    }

    /// Applies a signed delta to a product's stock and logs it.
    ///
    /// Returns the product as stored after the change. A delta that would
    /// leave stock below zero fails with `NegativeStock` and changes
    /// nothing; a zero delta is a validation error.
    pub async fn adjust_stock(
        &self,
        product_id: &str,
        delta: i64,
        notes: Option<String>,
    ) -> ServiceResult<Product> {
        validate_adjustment_delta(delta)?;

        let mut uow = self.db.begin().await?;
        let result = Self::apply_adjustment(&mut uow, product_id, delta, notes).await;
        let product = uow.finish(result).await?;

        info!(
            product_id = %product.id,
            delta,
            current_stock = product.current_stock,
            "Stock adjusted"
        );
        Ok(product)
    }

    async fn apply_adjustment(
        uow: &mut UnitOfWork,
        product_id: &str,
        delta: i64,
        notes: Option<String>,
    ) -> ServiceResult<Product> {
        let product = ProductRepository::fetch_by_id(uow.conn(), product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let next = apply_stock_delta(&product, delta)?;

        ProductRepository::apply_stock_delta(uow.conn(), &product.id, delta).await?;

        let entry = InventoryHistory {
            id: generate_id(),
            product_id: product.id.clone(),
            quantity_changed: delta,
            operation_type: TransactionType::Adjustment,
            reference: STOCK_ADJUSTMENT_REFERENCE.to_string(),
            notes: notes.filter(|n| !n.trim().is_empty()),
            created_at: Utc::now(),
        };
        InventoryHistoryRepository::append(uow.conn(), &entry).await?;

        Ok(Product {
            current_stock: next,
            ..product
        })
    }

    /// A product's stock movements, newest first.
    pub async fn history(&self, product_id: &str) -> ServiceResult<Vec<InventoryHistory>> {
        Ok(self.db.inventory().list_for_product(product_id).await?)
    }

    /// Movements written by one transaction or adjustment reference.
    pub async fn history_for_reference(&self, reference: &str) -> ServiceResult<Vec<InventoryHistory>> {
        Ok(self.db.inventory().list_by_reference(reference).await?)
    }
}
