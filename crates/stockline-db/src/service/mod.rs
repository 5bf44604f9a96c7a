//! # Services
//!
//! Business operations that span several repositories. Every write path
//! runs inside one [`UnitOfWork`](crate::UnitOfWork): all of it commits,
//! or none of it does.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockline                              │
//! │                                                                         │
//! │  service.process_sale(new_txn)                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Validation?      ── ValidationError ─┐                          │  │
//! │  │  Business rule?   ── CoreError ───────┼──► ServiceError          │  │
//! │  │  SQLite?          ── DbError ─────────┘      │                   │  │
//! │  │                                              ▼                   │  │
//! │  │                                 uow.finish(Err) → ROLLBACK       │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  caller: err.code() for branching, err.user_message() for display      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod inventory;
pub mod party;
pub mod report;
pub mod sales;

use serde::Serialize;
use thiserror::Error;

use crate::error::DbError;
use stockline_core::{CoreError, ValidationError};

pub use catalog::{CategoryService, ProductService};
pub use inventory::InventoryService;
pub use party::{CustomerService, SupplierService};
pub use report::ReportService;
pub use sales::TransactionService;

/// Error returned by every service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced entity does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Sale line asks for more than is on the shelf
    InsufficientStock,

    /// Adjustment would drive stock below zero
    NegativeStock,

    /// Unique value (barcode) already taken
    Conflict,

    /// Operation not allowed in the current state
    BusinessLogic,

    /// Database operation failed
    DatabaseError,
}

impl ServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::Core(err) => match err {
                CoreError::ProductNotFound(_)
                | CoreError::CategoryNotFound(_)
                | CoreError::SupplierNotFound(_)
                | CoreError::CustomerNotFound(_)
                | CoreError::TransactionNotFound(_) => ErrorCode::NotFound,
                CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
                CoreError::NegativeStock { .. } => ErrorCode::NegativeStock,
                CoreError::DuplicateBarcode(_) => ErrorCode::Conflict,
                CoreError::ProductInUse(_) => ErrorCode::BusinessLogic,
                CoreError::TooManyLines { .. }
                | CoreError::InvalidAmount { .. }
                | CoreError::Validation(_) => ErrorCode::ValidationError,
            },
            ServiceError::Db(err) => match err {
                DbError::NotFound { .. } => ErrorCode::NotFound,
                DbError::UniqueViolation { .. } => ErrorCode::Conflict,
                DbError::ForeignKeyViolation { .. } => ErrorCode::ValidationError,
                _ => ErrorCode::DatabaseError,
            },
        }
    }

    /// Message suitable for showing to the person at the till.
    ///
    /// Domain errors are shown as-is. Infrastructure errors are logged in
    /// full and replaced by a generic message.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Core(err) => err.to_string(),
            ServiceError::Db(err) => match err {
                DbError::NotFound { .. } => err.to_string(),
                DbError::UniqueViolation { .. } if err.is_barcode_conflict() => {
                    "A product with this barcode already exists".to_string()
                }
                DbError::UniqueViolation { field, .. } => format!("{field} already exists"),
                DbError::ForeignKeyViolation { message } => {
                    tracing::error!("Foreign key violation: {}", message);
                    "Invalid reference".to_string()
                }
                DbError::ConstraintViolation { message } => {
                    tracing::error!("Constraint violation: {}", message);
                    "The change was rejected by a data rule".to_string()
                }
                DbError::ConnectionFailed(_) | DbError::PoolExhausted => {
                    "Database is unavailable".to_string()
                }
                other => {
                    tracing::error!("Database operation failed: {}", other);
                    "Database operation failed".to_string()
                }
            },
        }
    }
}
