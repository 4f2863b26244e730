//! # Catalog Repository
//!
//! Wash services and retail products.
//!
//! ## Stock Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  current_stock changes in exactly one place: the guarded decrement      │
//! │  below, called from inside the checkout transaction.                    │
//! │                                                                         │
//! │  UPDATE products                                                        │
//! │  SET current_stock = current_stock - :qty                               │
//! │  WHERE id = :id AND current_stock >= :qty                               │
//! │                                                                         │
//! │  rows_affected = 0 and the product exists ⇒ not enough stock ⇒         │
//! │  the WHOLE checkout rolls back. Stock can never go negative.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use aqua_core::validation::{validate_name, validate_price_rupiah};
use aqua_core::{CoreError, Product, Service, ValidationError};

/// Fields accepted when adding a service to the menu.
#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub price_rupiah: i64,
    pub duration_minutes: i64,
    pub category: Option<String>,
}

/// Fields accepted when adding a retail product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: Option<String>,
    pub price_rupiah: i64,
    pub current_stock: i64,
    pub min_stock: i64,
    pub unit: Option<String>,
}

/// Repository for the service menu and product shelf.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Services
    // =========================================================================

    /// Adds a service to the menu.
    pub async fn create_service(&self, input: NewService) -> DbResult<Service> {
        validate_name(&input.name).map_err(CoreError::from)?;
        validate_price_rupiah(input.price_rupiah).map_err(CoreError::from)?;
        if input.duration_minutes <= 0 {
            return Err(CoreError::from(ValidationError::must_be_positive(
                "durationMinutes",
            ))
            .into());
        }

        let service = Service {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            price_rupiah: input.price_rupiah,
            duration_minutes: input.duration_minutes,
            category: input.category,
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(id = %service.id, name = %service.name, "Creating service");

        sqlx::query(
            r#"
            INSERT INTO services (
                id, name, description, price_rupiah,
                duration_minutes, category, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&service.id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.price_rupiah)
        .bind(service.duration_minutes)
        .bind(&service.category)
        .bind(service.is_active)
        .bind(service.created_at)
        .execute(&self.pool)
        .await?;

        Ok(service)
    }

    /// Gets a service by ID.
    pub async fn get_service(&self, id: &str) -> DbResult<Option<Service>> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, name, description, price_rupiah,
                   duration_minutes, category, is_active, created_at
            FROM services
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(service)
    }

    /// Lists active services, alphabetical.
    pub async fn list_services(&self) -> DbResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, name, description, price_rupiah,
                   duration_minutes, category, is_active, created_at
            FROM services
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Adds a retail product to the shelf.
    pub async fn create_product(&self, input: NewProduct) -> DbResult<Product> {
        validate_name(&input.name).map_err(CoreError::from)?;
        validate_price_rupiah(input.price_rupiah).map_err(CoreError::from)?;
        if input.current_stock < 0 {
            return Err(CoreError::from(ValidationError::must_not_be_negative(
                "currentStock",
            ))
            .into());
        }
        if input.min_stock < 0 {
            return Err(CoreError::from(ValidationError::must_not_be_negative(
                "minStock",
            ))
            .into());
        }

        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            category: input.category,
            price_rupiah: input.price_rupiah,
            current_stock: input.current_stock,
            min_stock: input.min_stock,
            unit: input.unit,
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(id = %product.id, name = %product.name, "Creating product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, price_rupiah,
                current_stock, min_stock, unit, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_rupiah)
        .bind(product.current_stock)
        .bind(product.min_stock)
        .bind(&product.unit)
        .bind(product.is_active)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID.
    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price_rupiah,
                   current_stock, min_stock, unit, is_active, created_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products, alphabetical.
    pub async fn list_products(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price_rupiah,
                   current_stock, min_stock, unit, is_active, created_at
            FROM products
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Products at or below their reorder threshold.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price_rupiah,
                   current_stock, min_stock, unit, is_active, created_at
            FROM products
            WHERE is_active = 1 AND current_stock <= min_stock
            ORDER BY current_stock ASC, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

// =============================================================================
// Transaction-Scoped Helpers (used by checkout)
// =============================================================================

/// Fetches an active service inside an open transaction.
pub(crate) async fn require_service(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    service_id: &str,
) -> DbResult<Service> {
    let service = sqlx::query_as::<_, Service>(
        r#"
        SELECT id, name, description, price_rupiah,
               duration_minutes, category, is_active, created_at
        FROM services
        WHERE id = ?1 AND is_active = 1
        "#,
    )
    .bind(service_id)
    .fetch_optional(&mut **tx)
    .await?;

    service.ok_or_else(|| DbError::not_found("Service", service_id))
}

/// Decrements stock for one product line, refusing to go negative.
///
/// The guard lives in the WHERE clause so the check and the write are
/// one statement. With zero rows affected the product either does not
/// exist or lacks stock; the earlier fetch distinguishes the two and
/// supplies the numbers for the refusal.
pub(crate) async fn decrement_stock(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    product_id: &str,
    quantity: i64,
) -> DbResult<()> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, category, price_rupiah,
               current_stock, min_stock, unit, is_active, created_at
        FROM products
        WHERE id = ?1 AND is_active = 1
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| DbError::not_found("Product", product_id))?;

    let result = sqlx::query(
        r#"
        UPDATE products
        SET current_stock = current_stock - ?2
        WHERE id = ?1 AND current_stock >= ?2
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::InsufficientStock {
            name: product.name,
            requested: quantity,
            available: product.current_stock,
        }
        .into());
    }

    debug!(product_id, quantity, "Stock decremented");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn shampoo(stock: i64, min: i64) -> NewProduct {
        NewProduct {
            name: "Car Shampoo".to_string(),
            category: Some("care".to_string()),
            price_rupiah: 15_000,
            current_stock: stock,
            min_stock: min,
            unit: Some("botol".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_services() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.catalog()
            .create_service(NewService {
                name: "Cuci Exterior".to_string(),
                description: None,
                price_rupiah: 50_000,
                duration_minutes: 30,
                category: Some("wash".to_string()),
            })
            .await
            .unwrap();

        let services = db.catalog().list_services().await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].price_rupiah, 50_000);
    }

    #[tokio::test]
    async fn test_create_service_rejects_bad_input() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let bad_price = NewService {
            name: "Cuci".to_string(),
            description: None,
            price_rupiah: -1,
            duration_minutes: 30,
            category: None,
        };
        assert!(db.catalog().create_service(bad_price).await.is_err());

        let bad_duration = NewService {
            name: "Cuci".to_string(),
            description: None,
            price_rupiah: 50_000,
            duration_minutes: 0,
            category: None,
        };
        assert!(db.catalog().create_service(bad_duration).await.is_err());
    }

    #[tokio::test]
    async fn test_low_stock_boundary() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // at threshold: reported
        db.catalog().create_product(shampoo(5, 5)).await.unwrap();
        // above threshold: not reported
        db.catalog()
            .create_product(NewProduct {
                name: "Wax".to_string(),
                ..shampoo(10, 5)
            })
            .await
            .unwrap();

        let low = db.catalog().low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Car Shampoo");
    }

    #[tokio::test]
    async fn test_guarded_decrement_refuses_oversell() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db.catalog().create_product(shampoo(3, 1)).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        decrement_stock(&mut tx, &product.id, 2).await.unwrap();

        let err = decrement_stock(&mut tx, &product.id, 2).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                requested: 2,
                available: 1,
                ..
            })
        ));
        tx.rollback().await.unwrap();

        // Rollback undid the successful decrement too
        let after = db.catalog().get_product(&product.id).await.unwrap().unwrap();
        assert_eq!(after.current_stock, 3);
    }

    #[tokio::test]
    async fn test_decrement_unknown_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let err = decrement_stock(&mut tx, "missing", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        tx.rollback().await.unwrap();
    }
}
