//! # stockline-db: Database Layer for Stockline
//!
//! Persistence and transactional services for the Stockline store:
//! catalog, stock, customers, suppliers, sales and returns, on SQLite via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockline Data Flow                              │
//! │                                                                         │
//! │  Caller (till UI, seed binary, tests)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockline-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   Services ─────────► UnitOfWork ─────────► Repositories        │   │
//! │  │   (sale, refund,      (one SQLite          (executor-generic    │   │
//! │  │    adjustment,         transaction)         SQL per table)      │   │
//! │  │    payments, reports)                                           │   │
//! │  │        │                                                        │   │
//! │  │        └── rules from stockline-core (totals, stock checks)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite (WAL)   <data dir>/stockline.db or STOCKLINE_DB_PATH   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Application settings from the environment
//! - [`pool`] - Connection pool creation and configuration
//! - [`unit_of_work`] - Transaction boundary shared by services
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per table group
//! - [`service`] - Business operations (sale, refund, adjustment, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockline_db::{AppConfig, Database, TransactionService};
//! use stockline_core::{NewTransaction, NewTransactionLine};
//!
//! let config = AppConfig::from_env()?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let sale = TransactionService::new(db.clone())
//!     .process_sale(NewTransaction {
//!         customer_id: None,
//!         paid_cents: 1_600,
//!         lines: vec![NewTransactionLine::new(product_id, 2, 800)],
//!     })
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigError};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use unit_of_work::UnitOfWork;

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::customer::CustomerRepository;
pub use repository::inventory::InventoryHistoryRepository;
pub use repository::product::ProductRepository;
pub use repository::supplier::SupplierRepository;
pub use repository::transaction::TransactionRepository;

pub use service::{
    CategoryService, CustomerService, ErrorCode, InventoryService, ProductService, ReportService,
    ServiceError, ServiceResult, SupplierService, TransactionService,
};
