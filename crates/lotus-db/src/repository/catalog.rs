//! # Catalog Repositories
//!
//! Storage for the records the sale engine prices against: products,
//! services, and promotions. The commit transaction reads these tables
//! inside its own transaction scope; the repositories here serve seeding,
//! administration, and tests.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use lotus_core::{Product, Promotion, ServiceItem};

// =============================================================================
// Products
// =============================================================================

/// New product input.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub cost_price_cents: i64,
    pub stock: i64,
    pub min_stock: i64,
    pub category_id: Option<i64>,
}

/// Product and category queries; the commit path re-reads products
/// through its own transaction, not through this type.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product and returns the stored record.
    pub async fn create(&self, input: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();

        debug!(name = %input.name, "Creating product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, description, price_cents, cost_price_cents,
                stock, min_stock, category_id, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.cost_price_cents)
        .bind(input.stock)
        .bind(input.min_stock)
        .bind(input.category_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            description: input.description.clone(),
            price_cents: input.price_cents,
            cost_price_cents: input.cost_price_cents,
            stock: input.stock,
            min_stock: input.min_stock,
            category_id: input.category_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, cost_price_cents,
                   stock, min_stock, category_id, is_active,
                   created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(product)
    }

    /// Counts all products, active or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(count)
    }

    /// Lists active products, ordered by name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, cost_price_cents,
                   stock, min_stock, category_id, is_active,
                   created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(products)
    }

    /// Applies a stock delta (positive restocks, negative corrects).
    ///
    /// Sale commits never go through here; they use the conditional
    /// decrement inside the commit transaction. The schema's stock CHECK
    /// rejects adjustments that would go below zero.
    pub async fn adjust_stock(&self, id: i64, delta: i64) -> DbResult<Product> {
        let now = Utc::now();

        debug!(product_id = id, delta, "Adjusting product stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a category and returns its id.
    pub async fn create_category(&self, name: &str) -> DbResult<i64> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO categories (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
        )
        .bind(name)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(result.last_insert_rowid())
    }
}

// =============================================================================
// Services
// =============================================================================

/// New service input.
#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
}

/// Service offering queries.
#[derive(Debug, Clone)]
pub struct ServiceRepository {
    pool: SqlitePool,
}

impl ServiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ServiceRepository { pool }
    }

    /// Inserts a service and returns the stored record.
    pub async fn create(&self, input: &NewService) -> DbResult<ServiceItem> {
        let now = Utc::now();

        debug!(name = %input.name, "Creating service");

        let result = sqlx::query(
            r#"
            INSERT INTO services (name, description, price_cents, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, 1, ?4, ?4)
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(ServiceItem {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            description: input.description.clone(),
            price_cents: input.price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets a service by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<ServiceItem>> {
        let service = sqlx::query_as::<_, ServiceItem>(
            r#"
            SELECT id, name, description, price_cents, is_active, created_at, updated_at
            FROM services
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(service)
    }

    /// Lists active services, ordered by name.
    pub async fn list_active(&self) -> DbResult<Vec<ServiceItem>> {
        let services = sqlx::query_as::<_, ServiceItem>(
            r#"
            SELECT id, name, description, price_cents, is_active, created_at, updated_at
            FROM services
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(services)
    }
}

// =============================================================================
// Promotions
// =============================================================================

/// New promotion input.
#[derive(Debug, Clone)]
pub struct NewPromotion {
    pub name: String,
    /// Basis points for percent promotions (1000 = 10%), cents otherwise.
    pub discount_value: i64,
    pub is_percent: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
}

/// Promotion queries, including the effective-window read the commit
/// path uses to honor a requested promotion.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Inserts a promotion and returns the stored record.
    pub async fn create(&self, input: &NewPromotion) -> DbResult<Promotion> {
        let now = Utc::now();

        debug!(name = %input.name, "Creating promotion");

        let result = sqlx::query(
            r#"
            INSERT INTO promotions (
                name, discount_value, is_percent,
                start_date, end_date, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(&input.name)
        .bind(input.discount_value)
        .bind(input.is_percent)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.is_active)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(Promotion {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            discount_value: input.discount_value,
            is_percent: input.is_percent,
            start_date: input.start_date,
            end_date: input.end_date,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets a promotion by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Promotion>> {
        let promotion = sqlx::query_as::<_, Promotion>(
            r#"
            SELECT id, name, discount_value, is_percent,
                   start_date, end_date, is_active,
                   created_at, updated_at
            FROM promotions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(promotion)
    }

    /// Lists promotions effective at the given instant.
    pub async fn list_effective(&self, now: DateTime<Utc>) -> DbResult<Vec<Promotion>> {
        let promotions = sqlx::query_as::<_, Promotion>(
            r#"
            SELECT id, name, discount_value, is_percent,
                   start_date, end_date, is_active,
                   created_at, updated_at
            FROM promotions
            WHERE is_active = 1 AND start_date <= ?1 AND end_date >= ?1
            ORDER BY name
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(promotions)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn product_input(name: &str, price_cents: i64, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            price_cents,
            cost_price_cents: price_cents / 2,
            stock,
            min_stock: 5,
            category_id: None,
        }
    }

    #[tokio::test]
    async fn test_product_create_and_get() {
        let db = test_db().await;

        let created = db
            .products()
            .create(&product_input("Paracetamol 500mg", 1500, 40))
            .await
            .unwrap();

        let fetched = db.products().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Paracetamol 500mg");
        assert_eq!(fetched.price_cents, 1500);
        assert_eq!(fetched.stock, 40);
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn test_product_with_category() {
        let db = test_db().await;

        let category_id = db.products().create_category("Analgesics").await.unwrap();
        let mut input = product_input("Ibuprofen 200mg", 1200, 30);
        input.category_id = Some(category_id);

        let created = db.products().create(&input).await.unwrap();
        assert_eq!(created.category_id, Some(category_id));
    }

    #[tokio::test]
    async fn test_product_dangling_category_rejected() {
        let db = test_db().await;

        let mut input = product_input("Orphan", 100, 1);
        input.category_id = Some(999);

        let err = db.products().create(&input).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let db = test_db().await;

        let product = db
            .products()
            .create(&product_input("Bandage", 300, 10))
            .await
            .unwrap();

        let restocked = db.products().adjust_stock(product.id, 15).await.unwrap();
        assert_eq!(restocked.stock, 25);

        let corrected = db.products().adjust_stock(product.id, -5).await.unwrap();
        assert_eq!(corrected.stock, 20);
    }

    #[tokio::test]
    async fn test_adjust_stock_unknown_product() {
        let db = test_db().await;

        let err = db.products().adjust_stock(999, 5).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_service_create_and_list() {
        let db = test_db().await;

        db.services()
            .create(&NewService {
                name: "General Consultation".to_string(),
                description: Some("30 minute appointment".to_string()),
                price_cents: 50000,
            })
            .await
            .unwrap();

        let services = db.services().list_active().await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "General Consultation");
    }

    #[tokio::test]
    async fn test_list_effective_promotions() {
        let db = test_db().await;
        let now = Utc::now();

        let current = NewPromotion {
            name: "Spring Sale".to_string(),
            discount_value: 1000,
            is_percent: true,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(7),
            is_active: true,
        };
        let expired = NewPromotion {
            name: "Winter Sale".to_string(),
            start_date: now - Duration::days(30),
            end_date: now - Duration::days(10),
            ..current.clone()
        };
        let disabled = NewPromotion {
            name: "Paused Sale".to_string(),
            is_active: false,
            ..current.clone()
        };

        db.promotions().create(&current).await.unwrap();
        db.promotions().create(&expired).await.unwrap();
        db.promotions().create(&disabled).await.unwrap();

        let effective = db.promotions().list_effective(now).await.unwrap();
        assert_eq!(effective.len(), 1);
        assert_eq!(effective[0].name, "Spring Sale");
    }
}
