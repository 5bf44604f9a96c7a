//! # Report Service
//!
//! Sales and profit figures over a closed date range `[start, end]`.
//! Only completed transactions count.
//!
//! ```text
//! total_sales  = Σ total          completed sales
//! sales        = Σ total          completed sales + returns (returns are negative)
//! cost         = Σ purchase × qty sale lines, minus return lines
//! gross_profit = sales − cost
//! ```

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::pool::Database;
use crate::service::ServiceResult;
use stockline_core::validation::validate_date_range;
use stockline_core::{Money, ProfitReport, TransactionType};

#[derive(Debug, Clone)]
pub struct ReportService {
    db: Database,
}

impl ReportService {
    pub fn new(db: Database) -> Self {
        ReportService { db }
    }

    /// Revenue from completed sales in the range.
    pub async fn total_sales(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ServiceResult<Money> {
        validate_date_range(start, end)?;

        let cents = self
            .db
            .transactions()
            .sum_totals(Some(TransactionType::Sale), start, end)
            .await?;

        Ok(Money::from_cents(cents))
    }

    /// Net sales, cost of goods and gross profit for the range.
    pub async fn profit(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ServiceResult<ProfitReport> {
        validate_date_range(start, end)?;

        let repo = self.db.transactions();
        let sales = repo.sum_totals(None, start, end).await?;
        let cost = repo.sum_cost(start, end).await?;

        debug!(sales, cost, "Profit report computed");
        Ok(ProfitReport::new(
            start,
            end,
            Money::from_cents(sales),
            Money::from_cents(cost),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use crate::service::{CategoryService, ErrorCode, ProductService, TransactionService};
    use chrono::Duration;
    use stockline_core::{CategoryInput, NewProduct, NewTransaction, NewTransactionLine};

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category = CategoryService::new(db.clone())
            .create_category(CategoryInput {
                name: "Snacks".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let product = ProductService::new(db.clone())
            .create_product(NewProduct {
                barcode: "8000500310427".to_string(),
                name: "Wafer".to_string(),
                description: None,
                category_id: category.id,
                supplier_id: None,
                purchase_price_cents: 60,
                sale_price_cents: 150,
                initial_stock: 50,
                minimum_stock: 5,
            })
            .await
            .unwrap();
        (db, product.id)
    }

    fn today() -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now - Duration::hours(1), now + Duration::hours(1))
    }

    #[tokio::test]
    async fn test_profit_nets_out_returns() {
        let (db, product_id) = setup().await;
        let sales = TransactionService::new(db.clone());

        sales
            .process_sale(NewTransaction {
                customer_id: None,
                paid_cents: 1_500,
                lines: vec![NewTransactionLine::new(&product_id, 10, 150)],
            })
            .await
            .unwrap();
        sales
            .process_refund(NewTransaction {
                customer_id: None,
                paid_cents: -300,
                lines: vec![NewTransactionLine::new(&product_id, 2, 150)],
            })
            .await
            .unwrap();

        let (start, end) = today();
        let service = ReportService::new(db);

        assert_eq!(service.total_sales(start, end).await.unwrap().cents(), 1_500);

        let report = service.profit(start, end).await.unwrap();
        assert_eq!(report.total_sales_cents, 1_200);
        assert_eq!(report.total_cost_cents, 480);
        assert_eq!(report.gross_profit().cents(), 720);
    }

    #[tokio::test]
    async fn test_empty_range_and_bad_range() {
        let (db, _) = setup().await;
        let service = ReportService::new(db);
        let (start, end) = today();

        let report = service.profit(start, end).await.unwrap();
        assert_eq!(report.gross_profit_cents, 0);

        let err = service.total_sales(end, start).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }
}
