//! # Party Services
//!
//! Customers and suppliers, each with a running balance.
//!
//! ```text
//! customer.balance  > 0  customer owes the store   (credit sales)
//! supplier.balance  > 0  store owes the supplier   (purchases on account)
//! ```
//!
//! ## record_payment
//! A debt payment is stored as a completed, line-less Sale with
//! `total = 0`, `paid = amount`, `balance = -amount`. The customer balance
//! is reduced by `amount` exactly once, in the same unit of work.

use chrono::Utc;
use tracing::info;

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::customer::CustomerRepository;
use crate::repository::product::generate_id;
use crate::repository::supplier::SupplierRepository;
use crate::repository::transaction::TransactionRepository;
use crate::service::{ServiceError, ServiceResult};
use crate::unit_of_work::UnitOfWork;
use stockline_core::validation::{
    validate_amount_cents, validate_party_name, validate_payment_amount, validate_search_query,
};
use stockline_core::{
    CoreError, Customer, CustomerInput, NewSupplierTransaction, Supplier, SupplierInput,
    SupplierTransaction, Transaction, TransactionStatus, TransactionType,
};

/// Trims optional contact fields; blank becomes `None`.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Customer Service
// =============================================================================

#[derive(Debug, Clone)]
pub struct CustomerService {
    db: Database,
}

impl CustomerService {
    pub fn new(db: Database) -> Self {
        CustomerService { db }
    }

    pub async fn create_customer(&self, input: CustomerInput) -> ServiceResult<Customer> {
        validate_party_name(&input.name)?;

        let now = Utc::now();
        let customer = Customer {
            id: generate_id(),
            name: input.name.trim().to_string(),
            phone: clean(input.phone),
            email: clean(input.email),
            address: clean(input.address),
            balance_cents: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        CustomerRepository::insert(self.db.pool(), &customer).await?;
        info!(id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Updates contact details. The balance only moves through
    /// transactions, payments and [`update_balance`](Self::update_balance).
    pub async fn update_customer(&self, id: &str, input: CustomerInput) -> ServiceResult<Customer> {
        validate_party_name(&input.name)?;

        let existing = self.get_customer(id).await?;
        let updated = Customer {
            name: input.name.trim().to_string(),
            phone: clean(input.phone),
            email: clean(input.email),
            address: clean(input.address),
            updated_at: Utc::now(),
            ..existing
        };

        CustomerRepository::update(self.db.pool(), &updated).await?;
        Ok(updated)
    }

    pub async fn get_customer(&self, id: &str) -> ServiceResult<Customer> {
        self.db
            .customers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()).into())
    }

    pub async fn search_by_name(&self, fragment: &str) -> ServiceResult<Vec<Customer>> {
        let fragment = validate_search_query(fragment)?;
        Ok(self.db.customers().search_by_name(&fragment).await?)
    }

    pub async fn list_customers(&self) -> ServiceResult<Vec<Customer>> {
        Ok(self.db.customers().list_active().await?)
    }

    /// Adds a signed amount to a customer's balance and returns the result.
    pub async fn update_balance(&self, id: &str, amount_cents: i64) -> ServiceResult<Customer> {
        if amount_cents == 0 {
            return Err(CoreError::InvalidAmount {
                reason: "balance change cannot be zero".to_string(),
            }
            .into());
        }
        validate_amount_cents("balance change", amount_cents)?;

        CustomerRepository::add_to_balance(self.db.pool(), id, amount_cents)
            .await
            .map_err(|e| match e {
                DbError::NotFound { .. } => {
                    ServiceError::from(CoreError::CustomerNotFound(id.to_string()))
                }
                other => other.into(),
            })?;

        info!(id = %id, amount_cents, "Customer balance updated");
        self.get_customer(id).await
    }

    /// Active customers who owe money, largest balance first.
    pub async fn debtors(&self) -> ServiceResult<Vec<Customer>> {
        Ok(self.db.customers().list_debtors().await?)
    }

    /// Records a debt payment from a customer.
    ///
    /// ## Returns
    /// * `Ok(Transaction)` - the stored payment record
    /// * `Err(ValidationError)` - amount is zero or negative
    /// * `Err(CustomerNotFound)` - nothing was written
    pub async fn record_payment(&self, customer_id: &str, amount_cents: i64) -> ServiceResult<Transaction> {
        validate_payment_amount(amount_cents)?;

        let mut uow = self.db.begin().await?;
        let result = Self::apply_payment(&mut uow, customer_id, amount_cents).await;
        let payment = uow.finish(result).await?;

        info!(
            id = %payment.id,
            customer_id = %customer_id,
            amount_cents,
            "Customer payment recorded"
        );
        Ok(payment)
    }

    async fn apply_payment(
        uow: &mut UnitOfWork,
        customer_id: &str,
        amount_cents: i64,
    ) -> ServiceResult<Transaction> {
        if CustomerRepository::fetch_by_id(uow.conn(), customer_id)
            .await?
            .is_none()
        {
            return Err(CoreError::CustomerNotFound(customer_id.to_string()).into());
        }

        let payment = Transaction {
            id: generate_id(),
            customer_id: Some(customer_id.to_string()),
            transaction_type: TransactionType::Sale,
            status: TransactionStatus::Completed,
            total_cents: 0,
            paid_cents: amount_cents,
            balance_cents: -amount_cents,
            transaction_date: Utc::now(),
        };

        TransactionRepository::insert(uow.conn(), &payment).await?;
        CustomerRepository::add_to_balance(uow.conn(), customer_id, payment.balance_cents).await?;

        Ok(payment)
    }

    /// Debt payments made by a customer, newest first.
    pub async fn payment_history(&self, customer_id: &str) -> ServiceResult<Vec<Transaction>> {
        Ok(self.db.transactions().list_payments(customer_id).await?)
    }
}

// =============================================================================
// Supplier Service
// =============================================================================

#[derive(Debug, Clone)]
pub struct SupplierService {
    db: Database,
}

impl SupplierService {
    pub fn new(db: Database) -> Self {
        SupplierService { db }
    }

    pub async fn create_supplier(&self, input: SupplierInput) -> ServiceResult<Supplier> {
        validate_party_name(&input.name)?;

        let now = Utc::now();
        let supplier = Supplier {
            id: generate_id(),
            name: input.name.trim().to_string(),
            contact_person: clean(input.contact_person),
            phone: clean(input.phone),
            email: clean(input.email),
            address: clean(input.address),
            balance_cents: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        SupplierRepository::insert(self.db.pool(), &supplier).await?;
        info!(id = %supplier.id, "Supplier created");
        Ok(supplier)
    }

    pub async fn update_supplier(&self, id: &str, input: SupplierInput) -> ServiceResult<Supplier> {
        validate_party_name(&input.name)?;

        let existing = self.get_supplier(id).await?;
        let updated = Supplier {
            name: input.name.trim().to_string(),
            contact_person: clean(input.contact_person),
            phone: clean(input.phone),
            email: clean(input.email),
            address: clean(input.address),
            updated_at: Utc::now(),
            ..existing
        };

        SupplierRepository::update(self.db.pool(), &updated).await?;
        Ok(updated)
    }

    pub async fn get_supplier(&self, id: &str) -> ServiceResult<Supplier> {
        self.db
            .suppliers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::SupplierNotFound(id.to_string()).into())
    }

    pub async fn search_by_name(&self, fragment: &str) -> ServiceResult<Vec<Supplier>> {
        let fragment = validate_search_query(fragment)?;
        Ok(self.db.suppliers().search_by_name(&fragment).await?)
    }

    pub async fn list_suppliers(&self) -> ServiceResult<Vec<Supplier>> {
        Ok(self.db.suppliers().list_active().await?)
    }

    /// Suppliers the store still owes, largest balance first.
    pub async fn outstanding(&self) -> ServiceResult<Vec<Supplier>> {
        Ok(self.db.suppliers().list_with_outstanding_balance().await?)
    }

    /// Appends a ledger entry and moves the supplier balance by its amount.
    pub async fn add_transaction(&self, input: NewSupplierTransaction) -> ServiceResult<SupplierTransaction> {
        if input.amount_cents == 0 {
            return Err(CoreError::InvalidAmount {
                reason: "supplier transaction amount cannot be zero".to_string(),
            }
            .into());
        }
        validate_amount_cents("supplier transaction amount", input.amount_cents)?;

        let entry = SupplierTransaction {
            id: generate_id(),
            supplier_id: input.supplier_id.trim().to_string(),
            kind: input.kind,
            amount_cents: input.amount_cents,
            reference: clean(input.reference),
            notes: clean(input.notes),
            transaction_date: Utc::now(),
        };

        let mut uow = self.db.begin().await?;
        let result = Self::apply_transaction(&mut uow, &entry).await;
        uow.finish(result).await?;

        info!(
            id = %entry.id,
            supplier_id = %entry.supplier_id,
            kind = ?entry.kind,
            amount_cents = entry.amount_cents,
            "Supplier transaction recorded"
        );
        Ok(entry)
    }

    async fn apply_transaction(uow: &mut UnitOfWork, entry: &SupplierTransaction) -> ServiceResult<()> {
        if SupplierRepository::fetch_by_id(uow.conn(), &entry.supplier_id)
            .await?
            .is_none()
        {
            return Err(CoreError::SupplierNotFound(entry.supplier_id.clone()).into());
        }

        SupplierRepository::insert_transaction(uow.conn(), entry).await?;
        SupplierRepository::add_to_balance(uow.conn(), &entry.supplier_id, entry.amount_cents).await?;
        Ok(())
    }

    /// A supplier's ledger, newest first.
    pub async fn transactions(&self, supplier_id: &str) -> ServiceResult<Vec<SupplierTransaction>> {
        Ok(self.db.suppliers().list_transactions(supplier_id).await?)
    }
}
