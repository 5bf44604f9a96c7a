use std::path::PathBuf;

use stockline_core::{
    CategoryInput, CoreError, CustomerInput, NewProduct, NewTransaction, NewTransactionLine,
    Product, TransactionType,
};
use stockline_db::{
    CategoryService, CustomerService, Database, DbConfig, ErrorCode, InventoryService,
    ProductService, ReportService, ServiceError, TransactionService,
};

struct Store {
    db: Database,
    products: ProductService,
    inventory: InventoryService,
    customers: CustomerService,
    sales: TransactionService,
    reports: ReportService,
    category_id: String,
}

async fn open(config: DbConfig) -> Store {
    let db = Database::new(config).await.unwrap();
    let category = CategoryService::new(db.clone())
        .create_category(CategoryInput {
            name: "Hardware".to_string(),
            description: None,
        })
        .await
        .unwrap();

    Store {
        products: ProductService::new(db.clone()),
        inventory: InventoryService::new(db.clone()),
        customers: CustomerService::new(db.clone()),
        sales: TransactionService::new(db.clone()),
        reports: ReportService::new(db.clone()),
        category_id: category.id,
        db,
    }
}

impl Store {
    async fn product(&self, barcode: &str, cost: i64, price: i64, stock: i64) -> Product {
        self.products
            .create_product(NewProduct {
                barcode: barcode.to_string(),
                name: format!("Item {barcode}"),
                description: None,
                category_id: self.category_id.clone(),
                supplier_id: None,
                purchase_price_cents: cost,
                sale_price_cents: price,
                initial_stock: stock,
                minimum_stock: 2,
            })
            .await
            .unwrap()
    }

    async fn stock(&self, id: &str) -> i64 {
        self.products.get_product(id).await.unwrap().current_stock
    }
}

fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("stockline-test-{}.db", uuid::Uuid::new_v4()))
}

fn remove_db(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

#[tokio::test]
async fn failed_sale_leaves_no_trace() {
    let store = open(DbConfig::in_memory()).await;
    let hammer = store.product("H-1", 500, 1_200, 4).await;
    let nails = store.product("N-1", 10, 25, 1).await;

    let err = store
        .sales
        .process_sale(NewTransaction {
            customer_id: None,
            paid_cents: 0,
            lines: vec![
                NewTransactionLine::new(&hammer.id, 2, 1_200),
                NewTransactionLine::new(&nails.id, 5, 25),
            ],
        })
        .await
        .unwrap_err();

    match err {
        ServiceError::Core(CoreError::InsufficientStock {
            product,
            available,
            requested,
        }) => {
            assert_eq!(product, "Item N-1");
            assert_eq!(available, 1);
            assert_eq!(requested, 5);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(store.stock(&hammer.id).await, 4);
    assert_eq!(store.stock(&nails.id).await, 1);
    assert!(store
        .sales
        .list_by_type(TransactionType::Sale)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(store.inventory.history(&hammer.id).await.unwrap().len(), 1);
}

async fn count_rows(db: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn failed_credit_sale_keeps_customer_balance() {
    let store = open(DbConfig::in_memory()).await;
    let level = store.product("L-1", 700, 1_500, 2).await;
    let customer = store
        .customers
        .create_customer(CustomerInput {
            name: "Linus".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    store.customers.update_balance(&customer.id, 300).await.unwrap();

    let err = store
        .sales
        .process_sale(NewTransaction {
            customer_id: Some(customer.id.clone()),
            paid_cents: 0,
            lines: vec![NewTransactionLine::new(&level.id, 3, 1_500)],
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InsufficientStock);

    assert_eq!(
        store.customers.get_customer(&customer.id).await.unwrap().balance_cents,
        300
    );
    assert_eq!(store.stock(&level.id).await, 2);
    assert!(store.sales.list_by_customer(&customer.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn failure_midway_through_writes_rolls_back_everything() {
    let store = open(DbConfig::in_memory()).await;
    let pliers = store.product("P-1", 300, 900, 6).await;
    let wrench = store.product("W-1", 400, 1_100, 6).await;
    let customer = store
        .customers
        .create_customer(CustomerInput {
            name: "Barbara".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    // Header, details and the first line's stock and history are already
    // written when the second line's history insert aborts.
    sqlx::query(&format!(
        "CREATE TRIGGER reject_wrench_history BEFORE INSERT ON inventory_history \
         WHEN NEW.product_id = '{}' AND NEW.operation_type = 'sale' \
         BEGIN SELECT RAISE(ABORT, 'history write failed'); END",
        wrench.id
    ))
    .execute(store.db.pool())
    .await
    .unwrap();

    let transactions_before = count_rows(&store.db, "transactions").await;
    let details_before = count_rows(&store.db, "transaction_details").await;
    let history_before = count_rows(&store.db, "inventory_history").await;

    let result = store
        .sales
        .process_sale(NewTransaction {
            customer_id: Some(customer.id.clone()),
            paid_cents: 0,
            lines: vec![
                NewTransactionLine::new(&pliers.id, 2, 900),
                NewTransactionLine::new(&wrench.id, 1, 1_100),
            ],
        })
        .await;
    assert!(result.is_err());

    assert_eq!(count_rows(&store.db, "transactions").await, transactions_before);
    assert_eq!(count_rows(&store.db, "transaction_details").await, details_before);
    assert_eq!(count_rows(&store.db, "inventory_history").await, history_before);
    assert_eq!(store.stock(&pliers.id).await, 6);
    assert_eq!(store.stock(&wrench.id).await, 6);
    assert_eq!(
        store.customers.get_customer(&customer.id).await.unwrap().balance_cents,
        0
    );

    sqlx::query("DROP TRIGGER reject_wrench_history")
        .execute(store.db.pool())
        .await
        .unwrap();
    let sale = store
        .sales
        .process_sale(NewTransaction {
            customer_id: Some(customer.id.clone()),
            paid_cents: 0,
            lines: vec![
                NewTransactionLine::new(&pliers.id, 2, 900),
                NewTransactionLine::new(&wrench.id, 1, 1_100),
            ],
        })
        .await
        .unwrap();
    assert_eq!(sale.transaction.balance_cents, 2_900);
    assert_eq!(store.stock(&pliers.id).await, 4);
}

#[tokio::test]
async fn history_always_sums_to_stock() {
    let store = open(DbConfig::in_memory()).await;
    let saw = store.product("S-1", 900, 2_000, 10).await;

    store
        .sales
        .process_sale(NewTransaction {
            customer_id: None,
            paid_cents: 6_000,
            lines: vec![NewTransactionLine::new(&saw.id, 3, 2_000)],
        })
        .await
        .unwrap();
    store
        .sales
        .process_refund(NewTransaction {
            customer_id: None,
            paid_cents: -2_000,
            lines: vec![NewTransactionLine::new(&saw.id, 1, 2_000)],
        })
        .await
        .unwrap();
    store
        .inventory
        .adjust_stock(&saw.id, -2, Some("Damaged".to_string()))
        .await
        .unwrap();

    let stock = store.stock(&saw.id).await;
    assert_eq!(stock, 6);
    assert_eq!(store.db.inventory().net_change(&saw.id).await.unwrap(), stock);

    let history = store.inventory.history(&saw.id).await.unwrap();
    let kinds: Vec<TransactionType> = history.iter().map(|h| h.operation_type).collect();
    assert_eq!(
        kinds,
        vec![
            TransactionType::Adjustment,
            TransactionType::Return,
            TransactionType::Sale,
            TransactionType::Adjustment,
        ]
    );

    assert!(!store.products.can_delete(&saw.id).await.unwrap());
    let err = store.products.delete(&saw.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::BusinessLogic);
}

#[tokio::test]
async fn credit_sale_then_payment_settles_customer() {
    let store = open(DbConfig::in_memory()).await;
    let drill = store.product("D-1", 4_000, 7_500, 3).await;
    let customer = store
        .customers
        .create_customer(CustomerInput {
            name: "Margaret".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let sale = store
        .sales
        .process_sale(NewTransaction {
            customer_id: Some(customer.id.clone()),
            paid_cents: 2_500,
            lines: vec![NewTransactionLine::new(&drill.id, 1, 7_500)],
        })
        .await
        .unwrap();
    assert_eq!(sale.transaction.balance_cents, 5_000);

    let debtors = store.customers.debtors().await.unwrap();
    assert_eq!(debtors.len(), 1);
    assert_eq!(debtors[0].balance_cents, 5_000);

    store.customers.record_payment(&customer.id, 5_000).await.unwrap();

    assert_eq!(
        store.customers.get_customer(&customer.id).await.unwrap().balance_cents,
        0
    );
    assert!(store.customers.debtors().await.unwrap().is_empty());
    assert_eq!(
        store.sales.list_by_customer(&customer.id).await.unwrap().len(),
        2
    );
    assert_eq!(
        store.customers.payment_history(&customer.id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn payments_do_not_count_as_revenue() {
    let store = open(DbConfig::in_memory()).await;
    let tape = store.product("T-1", 100, 300, 20).await;
    let customer = store
        .customers
        .create_customer(CustomerInput {
            name: "Ken".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    store
        .sales
        .process_sale(NewTransaction {
            customer_id: Some(customer.id.clone()),
            paid_cents: 0,
            lines: vec![NewTransactionLine::new(&tape.id, 4, 300)],
        })
        .await
        .unwrap();
    store.customers.record_payment(&customer.id, 1_200).await.unwrap();

    let now = chrono::Utc::now();
    let (start, end) = (now - chrono::Duration::minutes(5), now + chrono::Duration::minutes(5));

    assert_eq!(store.reports.total_sales(start, end).await.unwrap().cents(), 1_200);
    let report = store.reports.profit(start, end).await.unwrap();
    assert_eq!(report.total_cost_cents, 400);
    assert_eq!(report.gross_profit_cents, 800);
}

#[tokio::test]
async fn data_survives_reopening_the_file() {
    let path = temp_db_path();

    let product_id = {
        let store = open(DbConfig::new(path.clone())).await;
        let glue = store.product("G-1", 150, 400, 9).await;
        store
            .sales
            .process_sale(NewTransaction {
                customer_id: None,
                paid_cents: 800,
                lines: vec![NewTransactionLine::new(&glue.id, 2, 400)],
            })
            .await
            .unwrap();
        store.db.close().await;
        glue.id
    };

    let db = Database::new(DbConfig::new(path.clone())).await.unwrap();
    let products = ProductService::new(db.clone());
    assert_eq!(products.get_product(&product_id).await.unwrap().current_stock, 7);
    assert!(TransactionService::new(db.clone())
        .last_completed()
        .await
        .unwrap()
        .is_some());

    db.close().await;
    remove_db(&path);
}
