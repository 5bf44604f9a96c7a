//! # Seed Data Generator
//!
//! Creates a database, inserts the default categories and fills the
//! catalog with demo products for development.
//!
//! ## Usage
//! ```bash
//! # Database from STOCKLINE_DB_PATH or the platform data dir, 60 products
//! cargo run -p stockline-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p stockline-db --bin seed -- --count 200 --db ./data/stockline.db
//! ```
//!
//! ## Generated Data
//! - Default categories (General, Electronics, Groceries)
//! - Products named `{item} {size}` with EAN-like barcodes `590{seed:010}`
//! - Sale price 1.99-9.99 plus a size addon, purchase price 60-80% of it
//! - Opening stock 0-100 (logged as a stock adjustment)
//! - One demo supplier and one walk-in customer

use std::env;
use std::time::Instant;

use stockline_core::{CustomerInput, NewProduct, SupplierInput};
use stockline_db::{
    AppConfig, CategoryService, CustomerService, Database, ProductService, SupplierService,
};
use tracing_subscriber::EnvFilter;

/// Demo items per default category.
const ITEMS: &[(&str, &[&str])] = &[
    (
        "General",
        &[
            "Notebook",
            "Ballpoint Pen",
            "Batteries AA",
            "Duct Tape",
            "Light Bulb",
            "Dish Soap",
        ],
    ),
    (
        "Electronics",
        &[
            "USB-C Cable",
            "Phone Charger",
            "Earbuds",
            "Power Bank",
            "HDMI Cable",
            "SD Card",
        ],
    ),
    (
        "Groceries",
        &[
            "Rice",
            "Pasta Penne",
            "Canned Beans",
            "Olive Oil",
            "Sugar",
            "Ground Coffee",
        ],
    ),
];

/// Size variants with their price addon in cents.
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 100),
    ("Large", 200),
    ("XL", 350),
];

const DEFAULT_COUNT: usize = 60;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockline=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = AppConfig::from_env()?;
    let mut count = DEFAULT_COUNT;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEFAULT_COUNT);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockline Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: {DEFAULT_COUNT})");
                println!("  -d, --db <PATH>    Database file path (default: STOCKLINE_DB_PATH or data dir)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockline Seed Data Generator");
    println!("=============================");
    println!("Store:    {}", config.store_name);
    println!("Database: {}", config.database_path.display());
    println!("Products: {}", count);
    println!();

    let db = Database::new(config.db_config()).await?;
    println!("✓ Connected to database, migrations applied");

    let categories = CategoryService::new(db.clone());
    let inserted = categories.ensure_defaults().await?;
    println!("✓ Default categories ready ({inserted} inserted)");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let supplier = SupplierService::new(db.clone())
        .create_supplier(SupplierInput {
            name: "Demo Wholesale".to_string(),
            contact_person: Some("Sam".to_string()),
            ..Default::default()
        })
        .await?;
    CustomerService::new(db.clone())
        .create_customer(CustomerInput {
            name: "Walk-in Customer".to_string(),
            ..Default::default()
        })
        .await?;

    println!();
    println!("Generating products...");

    let products = ProductService::new(db.clone());
    let start = Instant::now();
    let mut generated = 0;

    'outer: for (category_idx, (category_name, items)) in ITEMS.iter().enumerate() {
        let Some(category) = categories
            .find_by_name(category_name)
            .await?
            .into_iter()
            .find(|c| c.name == *category_name)
        else {
            eprintln!("Category {category_name} missing, skipping its items");
            continue;
        };

        for (item_idx, item) in items.iter().enumerate() {
            for (size_idx, (size, addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = category_idx * 1000 + item_idx * 20 + size_idx;
                let input = demo_product(
                    &category.id,
                    (category_idx == 0).then(|| supplier.id.clone()),
                    item,
                    size,
                    *addon,
                    seed,
                );

                if let Err(e) = products.create_product(input).await {
                    eprintln!("Failed to insert {item} {size}: {}", e.user_message());
                    continue;
                }
                generated += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    let low = products.low_stock().await?;
    println!("  Low stock: {} products", low.len());
    let search = products.search("cable", 10).await?;
    println!("  Search 'cable': {} results", search.len());

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Builds one demo product with deterministic prices and stock.
fn demo_product(
    category_id: &str,
    supplier_id: Option<String>,
    item: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> NewProduct {
    let sale_price_cents = 199 + ((seed * 17) % 800) as i64 + price_addon;
    let cost_pct = 60 + (seed % 20) as i64;

    NewProduct {
        barcode: format!("590{:010}", seed),
        name: format!("{} {}", item, size),
        description: None,
        category_id: category_id.to_string(),
        supplier_id,
        purchase_price_cents: sale_price_cents * cost_pct / 100,
        sale_price_cents,
        initial_stock: (seed % 101) as i64,
        minimum_stock: 5,
    }
}
