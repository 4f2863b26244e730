//! # Customer Repository
//!
//! Customer CRUD and the phone lookup the counter runs on.
//!
//! ## Accumulator Invariant
//! `total_visits` and `total_spending_rupiah` are NEVER written here.
//! They change exactly one way: checkout commits a transaction carrying
//! this customer's id (see `transaction.rs`). `update()` deliberately has
//! no way to express them.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use aqua_core::validation::{validate_name, validate_phone, validate_search_query};
use aqua_core::Customer;

/// Fields accepted when registering a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_number: Option<String>,
    pub vehicle_type: Option<String>,
}

/// Editable customer fields. Visits and spending are absent on purpose.
#[derive(Debug, Clone)]
pub struct CustomerUpdate {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_number: Option<String>,
    pub vehicle_type: Option<String>,
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Registers a customer. Phone must be unused.
    pub async fn create(&self, input: NewCustomer) -> DbResult<Customer> {
        validate_name(&input.name).map_err(aqua_core::CoreError::from)?;
        validate_phone(&input.phone).map_err(aqua_core::CoreError::from)?;

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            email: input.email,
            vehicle_number: input.vehicle_number,
            vehicle_type: input.vehicle_type,
            total_visits: 0,
            total_spending_rupiah: 0,
            join_date: Utc::now(),
        };

        debug!(id = %customer.id, phone = %customer.phone, "Creating customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, phone, email,
                vehicle_number, vehicle_type,
                total_visits, total_spending_rupiah, join_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.vehicle_number)
        .bind(&customer.vehicle_type)
        .bind(customer.total_visits)
        .bind(customer.total_spending_rupiah)
        .bind(customer.join_date)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email,
                   vehicle_number, vehicle_type,
                   total_visits, total_spending_rupiah, join_date
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Finds a customer by exact phone number.
    pub async fn find_by_phone(&self, phone: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email,
                   vehicle_number, vehicle_type,
                   total_visits, total_spending_rupiah, join_date
            FROM customers
            WHERE phone = ?1
            "#,
        )
        .bind(phone.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Updates a customer's editable fields.
    pub async fn update(&self, id: &str, update: CustomerUpdate) -> DbResult<Customer> {
        validate_name(&update.name).map_err(aqua_core::CoreError::from)?;
        validate_phone(&update.phone).map_err(aqua_core::CoreError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                phone = ?3,
                email = ?4,
                vehicle_number = ?5,
                vehicle_type = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.name.trim())
        .bind(update.phone.trim())
        .bind(&update.email)
        .bind(&update.vehicle_number)
        .bind(&update.vehicle_type)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Lists customers, optionally filtered by name, phone, or plate.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Customer>> {
        let query = match search {
            Some(q) => validate_search_query(q).map_err(aqua_core::CoreError::from)?,
            None => String::new(),
        };

        let customers = if query.is_empty() {
            sqlx::query_as::<_, Customer>(
                r#"
                SELECT id, name, phone, email,
                       vehicle_number, vehicle_type,
                       total_visits, total_spending_rupiah, join_date
                FROM customers
                ORDER BY name
                "#,
            )
            .fetch_all(&self.pool)
            .await?
        } else {
            let pattern = format!("%{query}%");
            sqlx::query_as::<_, Customer>(
                r#"
                SELECT id, name, phone, email,
                       vehicle_number, vehicle_type,
                       total_visits, total_spending_rupiah, join_date
                FROM customers
                WHERE name LIKE ?1 OR phone LIKE ?1 OR vehicle_number LIKE ?1
                ORDER BY name
                "#,
            )
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(customers)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn budi() -> NewCustomer {
        NewCustomer {
            name: "Budi Santoso".to_string(),
            phone: "081234567890".to_string(),
            email: None,
            vehicle_number: Some("B 1234 XYZ".to_string()),
            vehicle_type: Some("SUV".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_by_phone() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let created = db.customers().create(budi()).await.unwrap();
        assert_eq!(created.total_visits, 0);
        assert_eq!(created.total_spending_rupiah, 0);

        let found = db
            .customers()
            .find_by_phone("081234567890")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.vehicle_number.as_deref(), Some("B 1234 XYZ"));
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.customers().create(budi()).await.unwrap();

        let mut dup = budi();
        dup.name = "Somebody Else".to_string();
        let err = db.customers().create(dup).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_edits_fields_but_not_accumulators() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let created = db.customers().create(budi()).await.unwrap();

        let updated = db
            .customers()
            .update(
                &created.id,
                CustomerUpdate {
                    name: "Budi S.".to_string(),
                    phone: "081234567890".to_string(),
                    email: Some("budi@example.com".to_string()),
                    vehicle_number: Some("B 9999 ZZZ".to_string()),
                    vehicle_type: Some("MPV".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Budi S.");
        assert_eq!(updated.email.as_deref(), Some("budi@example.com"));
        assert_eq!(updated.total_visits, 0);
        assert_eq!(updated.total_spending_rupiah, 0);
    }

    #[tokio::test]
    async fn test_update_unknown_customer_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db
            .customers()
            .update(
                "missing",
                CustomerUpdate {
                    name: "X Y".to_string(),
                    phone: "081234567890".to_string(),
                    email: None,
                    vehicle_number: None,
                    vehicle_type: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_search_matches_name_phone_plate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.customers().create(budi()).await.unwrap();
        db.customers()
            .create(NewCustomer {
                name: "Citra Dewi".to_string(),
                phone: "089876543210".to_string(),
                email: None,
                vehicle_number: Some("D 5678 ABC".to_string()),
                vehicle_type: None,
            })
            .await
            .unwrap();

        let all = db.customers().list(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let by_name = db.customers().list(Some("citra")).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Citra Dewi");

        let by_plate = db.customers().list(Some("1234 XYZ")).await.unwrap();
        assert_eq!(by_plate.len(), 1);
        assert_eq!(by_plate[0].name, "Budi Santoso");

        let none = db.customers().list(Some("zzz")).await.unwrap();
        assert!(none.is_empty());
    }
}
