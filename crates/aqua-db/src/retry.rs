//! # Write Retry
//!
//! Bounded retry for transactional flows that can lose a race.
//!
//! ## Why Retry At All
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two registers check out at the same moment:                            │
//! │                                                                         │
//! │  Register A: read last invoice → INV-20260822-0007                     │
//! │  Register B: read last invoice → INV-20260822-0007   (same!)           │
//! │  Register A: insert INV-20260822-0008 ─── commits                      │
//! │  Register B: insert INV-20260822-0008 ─── UNIQUE violation             │
//! │                                                                         │
//! │  B's whole transaction rolls back, then runs again from the top:       │
//! │  shift re-checked, entitlement re-checked, stock re-checked,           │
//! │  next invoice re-read. Attempt 2 sees 0008 taken and issues 0009.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same treatment covers SQLITE_BUSY that outlives the busy timeout.
//! Deterministic refusals (insufficient stock, closed shift) are NOT
//! retried; `DbError::is_transient` is the gate.

use std::future::Future;

use tracing::warn;

use crate::error::DbResult;

/// How many times a transient write failure is attempted before giving up.
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Runs a transactional flow, retrying transient failures.
///
/// The closure must rebuild the ENTIRE flow on each call, validation
/// included; state read on a failed attempt is stale by definition.
///
/// ## Example
/// ```rust,ignore
/// let tx = with_write_retry("checkout", || {
///     self.checkout_attempt(&input)
/// })
/// .await?;
/// ```
pub async fn with_write_retry<T, F, Fut>(op_name: &str, mut op: F) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let mut attempt: u32 = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < MAX_WRITE_ATTEMPTS => {
                warn!(
                    op = op_name,
                    attempt,
                    error = %err,
                    "Transient write failure, retrying"
                );
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
