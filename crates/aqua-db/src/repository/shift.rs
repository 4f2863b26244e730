//! # Shift Repository
//!
//! Shift open/close with cash-drawer reconciliation.
//!
//! ## Shift Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Shift Lifecycle                                   │
//! │                                                                         │
//! │  1. OPEN (one per kasir)                                                │
//! │     └── open() → Shift { status: Open, opening_balance }                │
//! │         second open for same kasir ⇒ refused                           │
//! │                                                                         │
//! │  2. SELL (checkout records transactions against the shift)              │
//! │     └── cash sales accumulate in the drawer                            │
//! │     └── card / qr / subscription sales do NOT                          │
//! │                                                                         │
//! │  3. CLOSE (one-way door)                                                │
//! │     └── close() → expected = opening + Σ cash totals                   │
//! │                   variance = counted − expected                        │
//! │         variance < 0: drawer short   variance > 0: drawer over         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The one-open-shift-per-kasir rule is checked in the flow and backed by
//! a partial unique index (`idx_shifts_kasir_open`), so two racing opens
//! cannot both commit.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::kasir::require_kasir;
use crate::retry::with_write_retry;
use aqua_core::validation::{validate_balance, validate_notes};
use aqua_core::{CoreError, Money, Shift, ValidationError};

/// A shift joined with the owning kasir's name, for history listings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShiftWithKasir {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub shift: Shift,
    pub kasir_name: String,
}

/// Repository for shift database operations.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    /// Creates a new ShiftRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    /// Opens a shift for a kasir with a counted opening float.
    ///
    /// Refused when the kasir is unknown, inactive, or already has an
    /// open shift.
    pub async fn open(&self, kasir_id: &str, opening_balance: Money) -> DbResult<Shift> {
        validate_balance("openingBalance", opening_balance.rupiah()).map_err(CoreError::from)?;

        with_write_retry("open_shift", || self.open_attempt(kasir_id, opening_balance)).await
    }

    async fn open_attempt(&self, kasir_id: &str, opening_balance: Money) -> DbResult<Shift> {
        let mut tx = self.pool.begin().await?;

        let kasir = require_kasir(&mut tx, kasir_id).await?;
        if !kasir.is_active {
            return Err(CoreError::from(ValidationError::NotAllowed {
                field: "kasirId".to_string(),
                reason: "kasir is inactive".to_string(),
            })
            .into());
        }

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM shifts WHERE kasir_id = ?1 AND status = 'open'",
        )
        .bind(kasir_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            return Err(CoreError::ShiftAlreadyOpen {
                kasir_id: kasir_id.to_string(),
            }
            .into());
        }

        let shift = Shift {
            id: Uuid::new_v4().to_string(),
            kasir_id: kasir_id.to_string(),
            status: aqua_core::ShiftStatus::Open,
            opening_balance_rupiah: opening_balance.rupiah(),
            closing_balance_rupiah: None,
            expected_balance_rupiah: None,
            variance_rupiah: None,
            notes: None,
            opened_at: Utc::now(),
            closed_at: None,
        };

        let insert = sqlx::query(
            r#"
            INSERT INTO shifts (
                id, kasir_id, status, opening_balance_rupiah, opened_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&shift.id)
        .bind(&shift.kasir_id)
        .bind(shift.status)
        .bind(shift.opening_balance_rupiah)
        .bind(shift.opened_at)
        .execute(&mut *tx)
        .await;

        // Two racing opens: the partial unique index catches the loser
        match insert {
            Ok(_) => {}
            Err(e) => {
                let db_err = DbError::from(e);
                if let DbError::UniqueViolation { field, .. } = &db_err {
                    if field.contains("shifts.kasir_id") {
                        return Err(CoreError::ShiftAlreadyOpen {
                            kasir_id: kasir_id.to_string(),
                        }
                        .into());
                    }
                }
                return Err(db_err);
            }
        }

        tx.commit().await?;

        info!(
            shift_id = %shift.id,
            kasir = %kasir.name,
            opening = %opening_balance,
            "Shift opened"
        );

        Ok(shift)
    }

    /// Returns the kasir's open shift, if any. Absence is not an error.
    pub async fn current(&self, kasir_id: &str) -> DbResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, kasir_id, status,
                   opening_balance_rupiah, closing_balance_rupiah,
                   expected_balance_rupiah, variance_rupiah,
                   notes, opened_at, closed_at
            FROM shifts
            WHERE kasir_id = ?1 AND status = 'open'
            "#,
        )
        .bind(kasir_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Gets a shift by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, kasir_id, status,
                   opening_balance_rupiah, closing_balance_rupiah,
                   expected_balance_rupiah, variance_rupiah,
                   notes, opened_at, closed_at
            FROM shifts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Closes a shift against a counted drawer.
    ///
    /// In one DB transaction: sums the shift's CASH transaction totals,
    /// derives expected and variance, and writes the terminal state.
    /// Card, QR, and subscription sales never touch the drawer and are
    /// excluded from the sum.
    pub async fn close(
        &self,
        shift_id: &str,
        closing_balance: Money,
        notes: Option<&str>,
    ) -> DbResult<Shift> {
        validate_balance("closingBalance", closing_balance.rupiah()).map_err(CoreError::from)?;
        validate_notes(notes).map_err(CoreError::from)?;

        with_write_retry("close_shift", || {
            self.close_attempt(shift_id, closing_balance, notes)
        })
        .await
    }

    async fn close_attempt(
        &self,
        shift_id: &str,
        closing_balance: Money,
        notes: Option<&str>,
    ) -> DbResult<Shift> {
        let mut tx = self.pool.begin().await?;

        let shift = sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, kasir_id, status,
                   opening_balance_rupiah, closing_balance_rupiah,
                   expected_balance_rupiah, variance_rupiah,
                   notes, opened_at, closed_at
            FROM shifts
            WHERE id = ?1
            "#,
        )
        .bind(shift_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Shift", shift_id))?;

        if !shift.is_open() {
            return Err(CoreError::ShiftAlreadyClosed {
                shift_id: shift_id.to_string(),
            }
            .into());
        }

        let cash_total_rupiah: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_rupiah), 0)
            FROM transactions
            WHERE shift_id = ?1 AND payment_method = 'cash'
            "#,
        )
        .bind(shift_id)
        .fetch_one(&mut *tx)
        .await?;

        let reconciliation = shift.reconcile(Money::from_rupiah(cash_total_rupiah), closing_balance);
        let closed_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE shifts SET
                status = 'closed',
                closing_balance_rupiah = ?2,
                expected_balance_rupiah = ?3,
                variance_rupiah = ?4,
                notes = ?5,
                closed_at = ?6
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(shift_id)
        .bind(closing_balance.rupiah())
        .bind(reconciliation.expected.rupiah())
        .bind(reconciliation.variance.rupiah())
        .bind(notes)
        .bind(closed_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ShiftAlreadyClosed {
                shift_id: shift_id.to_string(),
            }
            .into());
        }

        tx.commit().await?;

        info!(
            shift_id,
            expected = %reconciliation.expected,
            variance = %reconciliation.variance,
            "Shift closed"
        );

        Ok(Shift {
            status: aqua_core::ShiftStatus::Closed,
            closing_balance_rupiah: Some(closing_balance.rupiah()),
            expected_balance_rupiah: Some(reconciliation.expected.rupiah()),
            variance_rupiah: Some(reconciliation.variance.rupiah()),
            notes: notes.map(str::to_string),
            closed_at: Some(closed_at),
            ..shift
        })
    }

    /// Shift history with kasir names, newest first.
    pub async fn list(&self, limit: i64) -> DbResult<Vec<ShiftWithKasir>> {
        let limit = limit.clamp(1, 500);

        let shifts = sqlx::query_as::<_, ShiftWithKasir>(
            r#"
            SELECT s.id, s.kasir_id, s.status,
                   s.opening_balance_rupiah, s.closing_balance_rupiah,
                   s.expected_balance_rupiah, s.variance_rupiah,
                   s.notes, s.opened_at, s.closed_at,
                   k.name AS kasir_name
            FROM shifts s
            JOIN kasirs k ON k.id = s.kasir_id
            ORDER BY s.opened_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = shifts.len(), "Listed shifts");
        Ok(shifts)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
