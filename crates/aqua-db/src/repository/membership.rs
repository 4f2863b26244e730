//! # Membership Repository
//!
//! Membership sales, phone lookup, and entitlement redemption.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                      Entitlement Resolution                          │
//! │                                                                      │
//! │  phone ──► customer ──► all memberships                              │
//! │                             │                                        │
//! │                             ├── keep: subscription type AND          │
//! │                             │         not expired                    │
//! │                             │                                        │
//! │                             └── pick: soonest end_date wins          │
//! │                                       (ties broken by id)            │
//! │                                                                      │
//! │  consume() burns the pick inside one DB transaction:                 │
//! │    INSERT membership_usages  +  usage_count += 1  +  last_used = now │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The usage row is the proof a free wash was granted; checkout later
//! claims it onto a receipt line. Usage rows are never updated or
//! deleted.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::catalog::require_service;
use crate::repository::kasir::require_kasir;
use crate::retry::with_write_retry;
use aqua_core::validation::{
    validate_extension_days, validate_notes, validate_phone, validate_price_rupiah,
};
use aqua_core::{
    pick_entitlement, CoreError, Customer, Membership, MembershipType, MembershipUsage, Money,
};

/// Repository for membership database operations.
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    pool: SqlitePool,
}

impl MembershipRepository {
    /// Creates a new MembershipRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MembershipRepository { pool }
    }

    /// Sells a membership package to an existing customer.
    ///
    /// The validity window starts now and runs for the package length;
    /// a regular membership gets the ten-year loyalty window.
    pub async fn create(
        &self,
        customer_id: &str,
        membership_type: MembershipType,
        price: Money,
        notes: Option<&str>,
    ) -> DbResult<Membership> {
        validate_price_rupiah(price.rupiah()).map_err(CoreError::from)?;
        validate_notes(notes).map_err(CoreError::from)?;

        let exists: Option<String> = sqlx::query_scalar("SELECT id FROM customers WHERE id = ?1")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Customer", customer_id));
        }

        let now = Utc::now();
        let membership = Membership {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            membership_type,
            start_date: now,
            end_date: now + Duration::days(membership_type.duration_days()),
            price_rupiah: price.rupiah(),
            usage_count: 0,
            last_used: None,
            notes: notes.map(str::to_string),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO memberships (
                id, customer_id, membership_type, start_date, end_date,
                price_rupiah, usage_count, last_used, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, NULL, ?7, ?8)
            "#,
        )
        .bind(&membership.id)
        .bind(&membership.customer_id)
        .bind(membership.membership_type)
        .bind(membership.start_date)
        .bind(membership.end_date)
        .bind(membership.price_rupiah)
        .bind(&membership.notes)
        .bind(membership.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            membership_id = %membership.id,
            customer_id,
            membership_type = ?membership.membership_type,
            "Membership created"
        );
        Ok(membership)
    }

    /// Gets a membership by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Membership>> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, customer_id, membership_type, start_date, end_date,
                   price_rupiah, usage_count, last_used, notes, created_at
            FROM memberships
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    /// Every membership on file, newest purchase first.
    pub async fn list_all(&self) -> DbResult<Vec<Membership>> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, customer_id, membership_type, start_date, end_date,
                   price_rupiah, usage_count, last_used, notes, created_at
            FROM memberships
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(memberships)
    }

    /// All memberships for one customer, newest purchase first.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<Membership>> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, customer_id, membership_type, start_date, end_date,
                   price_rupiah, usage_count, last_used, notes, created_at
            FROM memberships
            WHERE customer_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(memberships)
    }

    /// Counter lookup: the customer behind a phone number plus every
    /// membership they hold, for the status display.
    pub async fn lookup_by_phone(&self, phone: &str) -> DbResult<(Customer, Vec<Membership>)> {
        validate_phone(phone).map_err(CoreError::from)?;
        let phone = phone.trim();

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, vehicle_number, vehicle_type,
                   total_visits, total_spending_rupiah, join_date
            FROM customers
            WHERE phone = ?1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", phone))?;

        let memberships = self.list_for_customer(&customer.id).await?;

        debug!(
            customer_id = %customer.id,
            memberships = memberships.len(),
            "Membership lookup"
        );
        Ok((customer, memberships))
    }

    /// Read-only preview of which membership would price a wash for
    /// this phone number. Nothing is written.
    pub async fn resolve_entitlement(&self, phone: &str) -> DbResult<(Customer, Membership)> {
        let (customer, memberships) = self.lookup_by_phone(phone).await?;

        let picked = pick_entitlement(&memberships, Utc::now())
            .cloned()
            .ok_or_else(|| {
                DbError::from(CoreError::NoEntitlement {
                    customer_id: customer.id.clone(),
                })
            })?;

        Ok((customer, picked))
    }

    /// Redeems one free wash against the customer's entitlement.
    ///
    /// Resolution happens again inside the transaction, so a membership
    /// that expired between preview and redemption is refused here. On
    /// success the usage row and the bumped counters commit together.
    ///
    /// Returns the usage proof and the membership as it stands after
    /// the redemption.
    pub async fn consume(
        &self,
        phone: &str,
        service_id: &str,
        kasir_id: &str,
    ) -> DbResult<(MembershipUsage, Membership)> {
        validate_phone(phone).map_err(CoreError::from)?;

        with_write_retry("consume_membership", || {
            self.consume_attempt(phone.trim(), service_id, kasir_id)
        })
        .await
    }

    async fn consume_attempt(
        &self,
        phone: &str,
        service_id: &str,
        kasir_id: &str,
    ) -> DbResult<(MembershipUsage, Membership)> {
        let mut tx = self.pool.begin().await?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, vehicle_number, vehicle_type,
                   total_visits, total_spending_rupiah, join_date
            FROM customers
            WHERE phone = ?1
            "#,
        )
        .bind(phone)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", phone))?;

        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, customer_id, membership_type, start_date, end_date,
                   price_rupiah, usage_count, last_used, notes, created_at
            FROM memberships
            WHERE customer_id = ?1
            "#,
        )
        .bind(&customer.id)
        .fetch_all(&mut *tx)
        .await?;

        let used_at = Utc::now();
        let picked = pick_entitlement(&memberships, used_at)
            .cloned()
            .ok_or_else(|| {
                DbError::from(CoreError::NoEntitlement {
                    customer_id: customer.id.clone(),
                })
            })?;

        let service = require_service(&mut tx, service_id).await?;
        let kasir = require_kasir(&mut tx, kasir_id).await?;

        let usage = MembershipUsage {
            id: Uuid::new_v4().to_string(),
            membership_id: picked.id.clone(),
            service_id: service.id.clone(),
            kasir_id: kasir.id.clone(),
            used_at,
        };

        sqlx::query(
            r#"
            INSERT INTO membership_usages (id, membership_id, service_id, kasir_id, used_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&usage.id)
        .bind(&usage.membership_id)
        .bind(&usage.service_id)
        .bind(&usage.kasir_id)
        .bind(usage.used_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE memberships
            SET usage_count = usage_count + 1, last_used = ?2
            WHERE id = ?1
            "#,
        )
        .bind(&picked.id)
        .bind(used_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            usage_id = %usage.id,
            membership_id = %picked.id,
            service = %service.name,
            "Membership wash redeemed"
        );

        let membership = Membership {
            usage_count: picked.usage_count + 1,
            last_used: Some(used_at),
            ..picked
        };
        Ok((usage, membership))
    }

    /// Extends a membership by whole days, stacking on its current
    /// end date. Works on expired memberships too, which is how a
    /// lapsed customer renews.
    pub async fn extend(&self, membership_id: &str, days: i64) -> DbResult<Membership> {
        validate_extension_days(days).map_err(CoreError::from)?;

        with_write_retry("extend_membership", || {
            self.extend_attempt(membership_id, days)
        })
        .await
    }

    async fn extend_attempt(&self, membership_id: &str, days: i64) -> DbResult<Membership> {
        let mut tx = self.pool.begin().await?;

        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, customer_id, membership_type, start_date, end_date,
                   price_rupiah, usage_count, last_used, notes, created_at
            FROM memberships
            WHERE id = ?1
            "#,
        )
        .bind(membership_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Membership", membership_id))?;

        let new_end = membership.extended_end_date(days);

        sqlx::query("UPDATE memberships SET end_date = ?2 WHERE id = ?1")
            .bind(membership_id)
            .bind(new_end)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(membership_id, days, "Membership extended");
        Ok(Membership {
            end_date: new_end,
            ..membership
        })
    }

    /// Redemption history for one membership, newest first.
    pub async fn usages(&self, membership_id: &str) -> DbResult<Vec<MembershipUsage>> {
        let usages = sqlx::query_as::<_, MembershipUsage>(
            r#"
            SELECT id, membership_id, service_id, kasir_id, used_at
            FROM membership_usages
            WHERE membership_id = ?1
            ORDER BY used_at DESC
            "#,
        )
        .bind(membership_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(usages)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::customer::NewCustomer;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(db: &Database, phone: &str) -> Customer {
        db.customers()
            .create(NewCustomer {
                name: "Budi".to_string(),
                phone: phone.to_string(),
                email: None,
                vehicle_number: None,
                vehicle_type: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_derives_validity_window() {
        let db = test_db().await;
        let customer = seed_customer(&db, "08123456789").await;

        let m = db
            .memberships()
            .create(
                &customer.id,
                MembershipType::Monthly,
                Money::from_rupiah(150_000),
                None,
            )
            .await
            .unwrap();

        assert_eq!((m.end_date - m.start_date).num_days(), 30);
        assert_eq!(m.usage_count, 0);
        assert!(m.last_used.is_none());

        let fetched = db.memberships().get_by_id(&m.id).await.unwrap().unwrap();
        assert_eq!(fetched.membership_type, MembershipType::Monthly);
    }

    #[tokio::test]
    async fn test_create_requires_existing_customer() {
        let db = test_db().await;

        let err = db
            .memberships()
            .create("missing", MembershipType::Annual, Money::zero(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_all_spans_customers() {
        let db = test_db().await;
        let first = seed_customer(&db, "08123456789").await;
        let second = seed_customer(&db, "08987654321").await;
        db.memberships()
            .create(&first.id, MembershipType::Monthly, Money::from_rupiah(150_000), None)
            .await
            .unwrap();
        db.memberships()
            .create(&second.id, MembershipType::Annual, Money::from_rupiah(1_400_000), None)
            .await
            .unwrap();

        let all = db.memberships().list_all().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_lookup_by_phone() {
        let db = test_db().await;
        let customer = seed_customer(&db, "08123456789").await;
        db.memberships()
            .create(&customer.id, MembershipType::Annual, Money::zero(), None)
            .await
            .unwrap();

        let (found, memberships) = db
            .memberships()
            .lookup_by_phone("08123456789")
            .await
            .unwrap();
        assert_eq!(found.id, customer.id);
        assert_eq!(memberships.len(), 1);

        let err = db
            .memberships()
            .lookup_by_phone("08999999999")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_regular_membership_grants_nothing() {
        let db = test_db().await;
        let customer = seed_customer(&db, "08123456789").await;
        db.memberships()
            .create(&customer.id, MembershipType::Regular, Money::zero(), None)
            .await
            .unwrap();

        let err = db
            .memberships()
            .resolve_entitlement("08123456789")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::NoEntitlement { .. })
        ));
    }

    #[tokio::test]
    async fn test_soonest_expiring_subscription_wins() {
        let db = test_db().await;
        let customer = seed_customer(&db, "08123456789").await;
        let monthly = db
            .memberships()
            .create(&customer.id, MembershipType::Monthly, Money::zero(), None)
            .await
            .unwrap();
        db.memberships()
            .create(&customer.id, MembershipType::Annual, Money::zero(), None)
            .await
            .unwrap();

        let (_, picked) = db
            .memberships()
            .resolve_entitlement("08123456789")
            .await
            .unwrap();
        assert_eq!(picked.id, monthly.id);
    }

    #[tokio::test]
    async fn test_consume_writes_proof_and_bumps_counters() {
        let db = test_db().await;
        let customer = seed_customer(&db, "08123456789").await;
        let membership = db
            .memberships()
            .create(&customer.id, MembershipType::Monthly, Money::zero(), None)
            .await
            .unwrap();
        let kasir = db.kasirs().create("Andi").await.unwrap();
        let service = db
            .catalog()
            .create_service(crate::repository::catalog::NewService {
                name: "Cuci Premium".to_string(),
                description: None,
                price_rupiah: 50_000,
                duration_minutes: 45,
                category: None,
            })
            .await
            .unwrap();

        let (usage, updated) = db
            .memberships()
            .consume("08123456789", &service.id, &kasir.id)
            .await
            .unwrap();

        assert_eq!(usage.membership_id, membership.id);
        assert_eq!(updated.usage_count, 1);
        assert!(updated.last_used.is_some());

        // Stored row agrees with the returned struct
        let stored = db
            .memberships()
            .get_by_id(&membership.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.usage_count, 1);
        assert_eq!(stored.last_used, updated.last_used);

        let history = db.memberships().usages(&membership.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, usage.id);
    }

    #[tokio::test]
    async fn test_consume_requires_active_service() {
        let db = test_db().await;
        let customer = seed_customer(&db, "08123456789").await;
        db.memberships()
            .create(&customer.id, MembershipType::Monthly, Money::zero(), None)
            .await
            .unwrap();
        let kasir = db.kasirs().create("Andi").await.unwrap();

        let err = db
            .memberships()
            .consume("08123456789", "missing-service", &kasir.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // Refused redemption leaves no usage rows behind
        let (_, memberships) = db
            .memberships()
            .lookup_by_phone("08123456789")
            .await
            .unwrap();
        assert_eq!(memberships[0].usage_count, 0);
    }

    #[tokio::test]
    async fn test_extend_stacks_on_end_date() {
        let db = test_db().await;
        let customer = seed_customer(&db, "08123456789").await;
        let membership = db
            .memberships()
            .create(&customer.id, MembershipType::Monthly, Money::zero(), None)
            .await
            .unwrap();

        let extended = db.memberships().extend(&membership.id, 30).await.unwrap();
        assert_eq!(extended.end_date, membership.end_date + Duration::days(30));

        assert!(db.memberships().extend(&membership.id, 0).await.is_err());
        assert!(db.memberships().extend("missing", 30).await.is_err());
    }
}
