//! # Catalog Services
//!
//! Product and category management with the checks the schema alone
//! cannot express nicely: readable duplicate-barcode errors, missing
//! category/supplier errors, and "can this product be deleted".

use chrono::Utc;
use tracing::{debug, info};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::category::CategoryRepository;
use crate::repository::inventory::InventoryHistoryRepository;
use crate::repository::product::{generate_id, ProductRepository};
use crate::repository::supplier::SupplierRepository;
use crate::service::{ServiceError, ServiceResult};
use crate::unit_of_work::UnitOfWork;
use stockline_core::validation::{
    validate_barcode, validate_category_name, validate_description, validate_price_cents,
    validate_product_name, validate_search_query, validate_stock_level,
};
use stockline_core::{
    Category, CategoryInput, CategorySummary, CoreError, InventoryHistory, NewProduct, Product,
    ProductUpdate, TransactionType, ValidationError, DEFAULT_CATEGORIES,
    STOCK_ADJUSTMENT_REFERENCE,
};

/// Default page size for product listings.
pub const DEFAULT_LIST_LIMIT: u32 = 500;

// =============================================================================
// Product Service
// =============================================================================

/// Product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductService {
    db: Database,
}

/// Fields shared by create and update, already trimmed.
struct ProductFields {
    barcode: String,
    name: String,
    description: Option<String>,
    category_id: String,
    supplier_id: Option<String>,
    purchase_price_cents: i64,
    sale_price_cents: i64,
    minimum_stock: i64,
}

impl ProductFields {
    #[allow(clippy::too_many_arguments)]
    fn validated(
        barcode: &str,
        name: &str,
        description: Option<String>,
        category_id: &str,
        supplier_id: Option<String>,
        purchase_price_cents: i64,
        sale_price_cents: i64,
        minimum_stock: i64,
    ) -> ServiceResult<Self> {
        validate_barcode(barcode)?;
        validate_product_name(name)?;
        validate_description(description.as_deref())?;
        validate_price_cents("purchase price", purchase_price_cents)?;
        validate_price_cents("sale price", sale_price_cents)?;
        validate_stock_level("minimum stock", minimum_stock)?;

        if category_id.trim().is_empty() {
            return Err(ValidationError::required("category").into());
        }

        Ok(ProductFields {
            barcode: barcode.trim().to_string(),
            name: name.trim().to_string(),
            description: description.filter(|d| !d.trim().is_empty()),
            category_id: category_id.trim().to_string(),
            supplier_id: supplier_id
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            purchase_price_cents,
            sale_price_cents,
            minimum_stock,
        })
    }
}

/// Maps a UNIQUE violation on the barcode column to the domain error.
fn barcode_conflict(barcode: &str) -> impl FnOnce(DbError) -> ServiceError + '_ {
    move |err| {
        if err.is_barcode_conflict() {
            CoreError::DuplicateBarcode(barcode.to_string()).into()
        } else {
            err.into()
        }
    }
}

impl ProductService {
    pub fn new(db: Database) -> Self {
        ProductService { db }
    }

    /// Creates a product.
    ///
    /// ## Checks (inside one unit of work)
    /// 1. Category exists → else `CategoryNotFound`
    /// 2. Supplier exists, if given → else `SupplierNotFound`
    /// 3. Barcode unused → else `DuplicateBarcode`
    ///
    /// Opening stock is logged as an adjustment so the inventory history
    /// always sums to the current stock.
    pub async fn create_product(&self, input: NewProduct) -> ServiceResult<Product> {
        let fields = ProductFields::validated(
            &input.barcode,
            &input.name,
            input.description,
            &input.category_id,
            input.supplier_id,
            input.purchase_price_cents,
            input.sale_price_cents,
            input.minimum_stock,
        )?;
        validate_stock_level("initial stock", input.initial_stock)?;

        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            barcode: fields.barcode,
            name: fields.name,
            description: fields.description,
            category_id: fields.category_id,
            supplier_id: fields.supplier_id,
            purchase_price_cents: fields.purchase_price_cents,
            sale_price_cents: fields.sale_price_cents,
            current_stock: input.initial_stock,
            minimum_stock: fields.minimum_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut uow = self.db.begin().await?;
        let result = Self::insert_product(&mut uow, &product).await;
        uow.finish(result).await?;

        info!(id = %product.id, barcode = %product.barcode, "Product created");
        Ok(product)
    }

    async fn insert_product(uow: &mut UnitOfWork, product: &Product) -> ServiceResult<()> {
        ensure_references(uow, &product.category_id, product.supplier_id.as_deref()).await?;

        if ProductRepository::barcode_owner(uow.conn(), &product.barcode)
            .await?
            .is_some()
        {
            return Err(CoreError::DuplicateBarcode(product.barcode.clone()).into());
        }

        ProductRepository::insert(uow.conn(), product)
            .await
            .map_err(barcode_conflict(&product.barcode))?;

        if product.current_stock > 0 {
            let entry = InventoryHistory {
                id: generate_id(),
                product_id: product.id.clone(),
                quantity_changed: product.current_stock,
                operation_type: TransactionType::Adjustment,
                reference: STOCK_ADJUSTMENT_REFERENCE.to_string(),
                notes: Some("Opening stock".to_string()),
                created_at: product.created_at,
            };
            InventoryHistoryRepository::append(uow.conn(), &entry).await?;
        }

        Ok(())
    }

    /// Updates catalog fields. Stock is untouched; use
    /// [`InventoryService::adjust_stock`](crate::service::InventoryService::adjust_stock).
    pub async fn update_product(&self, id: &str, input: ProductUpdate) -> ServiceResult<Product> {
        let fields = ProductFields::validated(
            &input.barcode,
            &input.name,
            input.description,
            &input.category_id,
            input.supplier_id,
            input.purchase_price_cents,
            input.sale_price_cents,
            input.minimum_stock,
        )?;

        let mut uow = self.db.begin().await?;
        let result = Self::apply_update(&mut uow, id, fields).await;
        let product = uow.finish(result).await?;

        info!(id = %product.id, "Product updated");
        Ok(product)
    }

    async fn apply_update(
        uow: &mut UnitOfWork,
        id: &str,
        fields: ProductFields,
    ) -> ServiceResult<Product> {
        let existing = ProductRepository::fetch_by_id(uow.conn(), id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        ensure_references(uow, &fields.category_id, fields.supplier_id.as_deref()).await?;

        if fields.barcode != existing.barcode {
            if let Some(owner) = ProductRepository::barcode_owner(uow.conn(), &fields.barcode).await? {
                if owner != existing.id {
                    return Err(CoreError::DuplicateBarcode(fields.barcode).into());
                }
            }
        }

        let updated = Product {
            barcode: fields.barcode,
            name: fields.name,
            description: fields.description,
            category_id: fields.category_id,
            supplier_id: fields.supplier_id,
            purchase_price_cents: fields.purchase_price_cents,
            sale_price_cents: fields.sale_price_cents,
            minimum_stock: fields.minimum_stock,
            ..existing
        };

        ProductRepository::update(uow.conn(), &updated)
            .await
            .map_err(barcode_conflict(&updated.barcode))?;

        ProductRepository::fetch_by_id(uow.conn(), id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Gets a product by ID, active or not.
    pub async fn get_product(&self, id: &str) -> ServiceResult<Product> {
        self.db
            .products()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Gets an active product by barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> ServiceResult<Option<Product>> {
        Ok(self.db.products().get_by_barcode(barcode).await?)
    }

    pub async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().list_active(DEFAULT_LIST_LIMIT).await?)
    }

    pub async fn list_by_category(&self, category_id: &str) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().list_by_category(category_id).await?)
    }

    /// Search-as-you-type over name and barcode.
    pub async fn search(&self, query: &str, limit: u32) -> ServiceResult<Vec<Product>> {
        let query = validate_search_query(query)?;
        debug!(query = %query, "Product search");
        Ok(self.db.products().search(&query, limit).await?)
    }

    /// Active products at or below their minimum stock.
    pub async fn low_stock(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().list_low_stock().await?)
    }

    /// Soft-deletes a product; history keeps referencing it.
    pub async fn deactivate(&self, id: &str) -> ServiceResult<()> {
        self.db.products().soft_delete(id).await.map_err(|e| match e {
            DbError::NotFound { .. } => ServiceError::from(CoreError::ProductNotFound(id.to_string())),
            other => other.into(),
        })?;
        info!(id = %id, "Product deactivated");
        Ok(())
    }

    /// Whether a product has no transaction lines and no inventory history.
    pub async fn can_delete(&self, id: &str) -> ServiceResult<bool> {
        Ok(self.db.products().movement_count(id).await? == 0)
    }

    /// Hard-deletes a product that was never moved.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.get_product(id).await?;

        if !self.can_delete(id).await? {
            return Err(CoreError::ProductInUse(id.to_string()).into());
        }

        self.db.products().delete(id).await?;
        info!(id = %id, "Product deleted");
        Ok(())
    }
}

/// Category must exist; supplier must exist when given.
async fn ensure_references(
    uow: &mut UnitOfWork,
    category_id: &str,
    supplier_id: Option<&str>,
) -> ServiceResult<()> {
    if CategoryRepository::fetch_by_id(uow.conn(), category_id)
        .await?
        .is_none()
    {
        return Err(CoreError::CategoryNotFound(category_id.to_string()).into());
    }

    if let Some(supplier_id) = supplier_id {
        if SupplierRepository::fetch_by_id(uow.conn(), supplier_id)
            .await?
            .is_none()
        {
            return Err(CoreError::SupplierNotFound(supplier_id.to_string()).into());
        }
    }

    Ok(())
}

// =============================================================================
// Category Service
// =============================================================================

#[derive(Debug, Clone)]
pub struct CategoryService {
    db: Database,
}

impl CategoryService {
    pub fn new(db: Database) -> Self {
        CategoryService { db }
    }

    pub async fn create_category(&self, input: CategoryInput) -> ServiceResult<Category> {
        validate_category_name(&input.name)?;
        validate_description(input.description.as_deref())?;

        let now = Utc::now();
        let category = Category {
            id: generate_id(),
            name: input.name.trim().to_string(),
            description: input.description.filter(|d| !d.trim().is_empty()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        CategoryRepository::insert(self.db.pool(), &category).await?;
        info!(id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update_category(&self, id: &str, input: CategoryInput) -> ServiceResult<Category> {
        validate_category_name(&input.name)?;
        validate_description(input.description.as_deref())?;

        let existing = self.get_category(id).await?;
        let updated = Category {
            name: input.name.trim().to_string(),
            description: input.description.filter(|d| !d.trim().is_empty()),
            updated_at: Utc::now(),
            ..existing
        };

        CategoryRepository::update(self.db.pool(), &updated).await?;
        Ok(updated)
    }

    pub async fn get_category(&self, id: &str) -> ServiceResult<Category> {
        self.db
            .categories()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::CategoryNotFound(id.to_string()).into())
    }

    /// Active categories whose name contains `fragment`.
    pub async fn find_by_name(&self, fragment: &str) -> ServiceResult<Vec<Category>> {
        let fragment = validate_search_query(fragment)?;
        Ok(self.db.categories().find_by_name(&fragment).await?)
    }

    pub async fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.db.categories().list_active().await?)
    }

    pub async fn list_with_counts(&self) -> ServiceResult<Vec<CategorySummary>> {
        Ok(self.db.categories().list_with_counts().await?)
    }

    /// Hides a category from listings. Its products keep their reference.
    pub async fn deactivate(&self, id: &str) -> ServiceResult<()> {
        self.db.categories().set_active(id, false).await.map_err(|e| match e {
            DbError::NotFound { .. } => CoreError::CategoryNotFound(id.to_string()).into(),
            other => ServiceError::from(other),
        })
    }

    /// Inserts any of the default categories that are missing.
    /// Returns how many were inserted.
    pub async fn ensure_defaults(&self) -> ServiceResult<usize> {
        let mut inserted = 0;

        for (name, description) in DEFAULT_CATEGORIES {
            if self.db.categories().exists_by_name(name).await? {
                continue;
            }

            self.create_category(CategoryInput {
                name: name.to_string(),
                description: Some(description.to_string()),
            })
            .await?;
            inserted += 1;
        }

        if inserted > 0 {
            info!(inserted, "Default categories seeded");
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use crate::service::ErrorCode;

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category = CategoryService::new(db.clone())
            .create_category(CategoryInput {
                name: "Electronics".to_string(),
                description: None,
            })
            .await
            .unwrap();
        (db, category.id)
    }

    fn new_product(category_id: &str, barcode: &str) -> NewProduct {
        NewProduct {
            barcode: barcode.to_string(),
            name: "USB-C Cable 1m".to_string(),
            description: Some("Braided".to_string()),
            category_id: category_id.to_string(),
            supplier_id: None,
            purchase_price_cents: 350,
            sale_price_cents: 899,
            initial_stock: 12,
            minimum_stock: 3,
        }
    }

    #[tokio::test]
    async fn test_create_logs_opening_stock() {
        let (db, category_id) = setup().await;
        let service = ProductService::new(db.clone());

        let product = service
            .create_product(new_product(&category_id, "5901234123457"))
            .await
            .unwrap();

        assert_eq!(product.current_stock, 12);
        let history = db.inventory().list_for_product(&product.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quantity_changed, 12);
        assert_eq!(history[0].reference, STOCK_ADJUSTMENT_REFERENCE);
    }

    #[tokio::test]
    async fn test_fetch_by_barcode_matches_created() {
        let (db, category_id) = setup().await;
        let service = ProductService::new(db);

        let created = service
            .create_product(new_product(&category_id, "  4006381333931 "))
            .await
            .unwrap();
        let fetched = service.get_by_barcode("4006381333931").await.unwrap().unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.name, created.name);
        assert_eq!(fetched.description, created.description);
        assert_eq!(fetched.category_id, created.category_id);
        assert_eq!(fetched.purchase_price_cents, 350);
        assert_eq!(fetched.sale_price_cents, 899);
        assert_eq!(fetched.current_stock, 12);
        assert_eq!(fetched.minimum_stock, 3);

        assert!(service.get_by_barcode("0000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_barcode() {
        let (db, category_id) = setup().await;
        let service = ProductService::new(db);

        service
            .create_product(new_product(&category_id, "111"))
            .await
            .unwrap();
        let err = service
            .create_product(new_product(&category_id, "111"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Core(CoreError::DuplicateBarcode(_))));
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_references() {
        let (db, category_id) = setup().await;
        let service = ProductService::new(db);

        let err = service
            .create_product(new_product("no-such-category", "111"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::CategoryNotFound(_))));

        let mut input = new_product(&category_id, "112");
        input.supplier_id = Some("no-such-supplier".to_string());
        let err = service.create_product(input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::SupplierNotFound(_))));

        let err = service
            .create_product(new_product("  ", "113"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert!(err.user_message().contains("category"));
    }

    #[tokio::test]
    async fn test_update_keeps_stock_and_checks_barcode() {
        let (db, category_id) = setup().await;
        let service = ProductService::new(db);

        let a = service
            .create_product(new_product(&category_id, "111"))
            .await
            .unwrap();
        service
            .create_product(new_product(&category_id, "222"))
            .await
            .unwrap();

        let update = ProductUpdate {
            barcode: "111".to_string(),
            name: "USB-C Cable 2m".to_string(),
            description: None,
            category_id: category_id.clone(),
            supplier_id: None,
            purchase_price_cents: 400,
            sale_price_cents: 1_099,
            minimum_stock: 5,
        };
        let updated = service.update_product(&a.id, update.clone()).await.unwrap();
        assert_eq!(updated.name, "USB-C Cable 2m");
        assert_eq!(updated.current_stock, 12);
        assert_eq!(updated.sale_price_cents, 1_099);

        let taken = ProductUpdate {
            barcode: "222".to_string(),
            ..update
        };
        let err = service.update_product(&a.id, taken).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::DuplicateBarcode(_))));
    }

    #[tokio::test]
    async fn test_delete_only_unmoved_products() {
        let (db, category_id) = setup().await;
        let service = ProductService::new(db);

        let stocked = service
            .create_product(new_product(&category_id, "111"))
            .await
            .unwrap();
        let mut empty_input = new_product(&category_id, "222");
        empty_input.initial_stock = 0;
        let empty = service.create_product(empty_input).await.unwrap();

        assert!(!service.can_delete(&stocked.id).await.unwrap());
        assert!(matches!(
            service.delete(&stocked.id).await,
            Err(ServiceError::Core(CoreError::ProductInUse(_)))
        ));

        assert!(service.can_delete(&empty.id).await.unwrap());
        service.delete(&empty.id).await.unwrap();
        assert!(matches!(
            service.get_product(&empty.id).await,
            Err(ServiceError::Core(CoreError::ProductNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_ensure_defaults_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = CategoryService::new(db);

        assert_eq!(service.ensure_defaults().await.unwrap(), DEFAULT_CATEGORIES.len());
        assert_eq!(service.ensure_defaults().await.unwrap(), 0);
        assert_eq!(
            service.list_categories().await.unwrap().len(),
            DEFAULT_CATEGORIES.len()
        );
    }

    #[tokio::test]
    async fn test_category_validation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = CategoryService::new(db);

        let err = service
            .create_category(CategoryInput {
                name: "  ".to_string(),
                description: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }
}
