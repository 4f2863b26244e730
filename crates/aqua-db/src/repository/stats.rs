//! # Stats Repository
//!
//! Read-only aggregates for the owner dashboard. Everything here is
//! derived from the ledger tables; nothing is cached or denormalized,
//! so the numbers always agree with the rows.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use aqua_core::EXPIRING_SOON_DAYS;

/// One kasir's sales for the day.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct KasirPerformance {
    pub kasir_id: String,
    pub kasir_name: String,
    pub transaction_count: i64,
    pub revenue_rupiah: i64,
}

/// The dashboard snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Sum of today's transaction totals, all payment methods.
    pub today_revenue_rupiah: i64,

    pub today_transactions: i64,

    /// Memberships with more than seven days remaining.
    pub active_memberships: i64,

    /// Memberships inside the seven-day expiry window.
    pub expiring_soon_memberships: i64,

    /// Active products at or below their reorder threshold.
    pub low_stock_count: i64,

    /// Today's sales per kasir, highest revenue first.
    pub kasir_performance: Vec<KasirPerformance>,
}

/// Repository for dashboard statistics.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    /// Creates a new StatsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StatsRepository { pool }
    }

    /// Computes the dashboard snapshot at the given instant.
    ///
    /// "Today" is the UTC day containing `now`. Membership counts use
    /// the same expiry thresholds as the status derivation: more than
    /// seven days left is active, within the window is expiring soon.
    pub async fn stats(&self, now: DateTime<Utc>) -> DbResult<DashboardStats> {
        let day_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);
        let expiry_window = now + Duration::days(EXPIRING_SOON_DAYS);

        let (today_transactions, today_revenue_rupiah): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_rupiah), 0)
            FROM transactions
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(day_start)
        .bind(day_end)
        .fetch_one(&self.pool)
        .await?;

        let active_memberships: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM memberships WHERE end_date > ?1")
                .bind(expiry_window)
                .fetch_one(&self.pool)
                .await?;

        let expiring_soon_memberships: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM memberships WHERE end_date > ?1 AND end_date <= ?2",
        )
        .bind(now)
        .bind(expiry_window)
        .fetch_one(&self.pool)
        .await?;

        let low_stock_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE is_active = 1 AND current_stock <= min_stock",
        )
        .fetch_one(&self.pool)
        .await?;

        let kasir_performance = sqlx::query_as::<_, KasirPerformance>(
            r#"
            SELECT t.kasir_id, k.name AS kasir_name,
                   COUNT(*) AS transaction_count,
                   COALESCE(SUM(t.total_rupiah), 0) AS revenue_rupiah
            FROM transactions t
            JOIN kasirs k ON k.id = t.kasir_id
            WHERE t.created_at >= ?1 AND t.created_at < ?2
            GROUP BY t.kasir_id, k.name
            ORDER BY revenue_rupiah DESC
            "#,
        )
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            revenue = today_revenue_rupiah,
            transactions = today_transactions,
            "Dashboard stats computed"
        );

        Ok(DashboardStats {
            today_revenue_rupiah,
            today_transactions,
            active_memberships,
            expiring_soon_memberships,
            low_stock_count,
            kasir_performance,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
