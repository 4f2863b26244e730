//! # Domain Types
//!
//! Core domain types used throughout AquaPOS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Shift       │   │   Membership    │   │  Transaction    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  kasir_id       │   │  customer_id    │   │  invoice_number │       │
//! │  │  opening_balance│   │  end_date       │   │  total_rupiah   │       │
//! │  │  variance       │   │  usage_count    │   │  payment_method │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ShiftStatus    │   │ MembershipType  │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Open           │   │  Regular        │   │  Cash /  Card   │       │
//! │  │  Closed         │   │  Monthly..Annual│   │  Qr / Subscr.   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived, Never Stored
//! Membership status and days remaining are computed from `end_date` at
//! read time. Storing them would let the database disagree with the clock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Kasir
// =============================================================================

/// A cashier known to the register.
///
/// This is a directory entry, not an account: authentication lives in the
/// identity system, only the display name and active flag live here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Kasir {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on shifts and receipts.
    pub name: String,

    /// Whether this kasir may open shifts.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer, addressed by phone number at the counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    /// Phone number, unique across customers (the counter lookup key).
    pub phone: String,

    pub email: Option<String>,

    /// Licence plate, e.g. "B 1234 XYZ".
    pub vehicle_number: Option<String>,

    /// Free-form vehicle description ("SUV", "Avanza", ...).
    pub vehicle_type: Option<String>,

    /// Lifetime completed-transaction count. Maintained by checkout only.
    pub total_visits: i64,

    /// Lifetime spend in rupiah. Maintained by checkout only.
    pub total_spending_rupiah: i64,

    pub join_date: DateTime<Utc>,
}

impl Customer {
    /// Returns lifetime spend as Money.
    #[inline]
    pub fn total_spending(&self) -> Money {
        Money::from_rupiah(self.total_spending_rupiah)
    }
}

// =============================================================================
// Service
// =============================================================================

/// A wash service on the menu (exterior wash, full detail, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Service {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    pub description: Option<String>,

    /// Price in whole rupiah.
    pub price_rupiah: i64,

    /// Expected duration, for the queue display.
    pub duration_minutes: i64,

    pub category: Option<String>,

    /// Whether service is offered (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl Service {
    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_rupiah(self.price_rupiah)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A retail product with tracked stock (shampoo, air freshener, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    pub category: Option<String>,

    /// Price in whole rupiah.
    pub price_rupiah: i64,

    /// On-hand stock. Never goes negative; checkout enforces this.
    pub current_stock: i64,

    /// Reorder threshold for the low-stock report.
    pub min_stock: i64,

    /// Sales unit ("pcs", "botol", ...).
    pub unit: Option<String>,

    /// Whether product is sold (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_rupiah(self.price_rupiah)
    }

    /// Checks whether on-hand stock covers a requested quantity.
    #[inline]
    pub fn has_stock(&self, quantity: i64) -> bool {
        self.current_stock >= quantity
    }

    /// Checks whether stock has fallen to the reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }
}

// =============================================================================
// Shift Status
// =============================================================================

/// The lifecycle state of a cash drawer shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    /// Drawer is open and accepting sales.
    Open,
    /// Drawer was counted and reconciled. Terminal state.
    Closed,
}

impl Default for ShiftStatus {
    fn default() -> Self {
        ShiftStatus::Open
    }
}

// =============================================================================
// Shift
// =============================================================================

/// A cash drawer session owned by one kasir.
///
/// A kasir has at most one open shift at a time. The three reconciliation
/// columns (`closing`, `expected`, `variance`) are written exactly once,
/// when the shift closes, and never touched again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Shift {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub kasir_id: String,

    pub status: ShiftStatus,

    /// Counted float when the drawer opened.
    pub opening_balance_rupiah: i64,

    /// Counted cash when the drawer closed.
    pub closing_balance_rupiah: Option<i64>,

    /// opening + cash-paid sale totals during the shift.
    pub expected_balance_rupiah: Option<i64>,

    /// closing - expected. Negative means the drawer came up short.
    pub variance_rupiah: Option<i64>,

    pub notes: Option<String>,

    pub opened_at: DateTime<Utc>,

    pub closed_at: Option<DateTime<Utc>>,
}

/// The arithmetic outcome of closing a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftReconciliation {
    /// opening balance + cash sales.
    pub expected: Money,
    /// counted closing - expected.
    pub variance: Money,
}

impl Shift {
    /// Checks whether the shift is still accepting sales.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == ShiftStatus::Open
    }

    /// Returns the opening float as Money.
    #[inline]
    pub fn opening_balance(&self) -> Money {
        Money::from_rupiah(self.opening_balance_rupiah)
    }

    /// Computes the expected drawer and the variance for a counted close.
    ///
    /// `cash_total` is the sum of cash-paid transaction totals recorded
    /// against this shift. Card, QR, and subscription sales never enter
    /// the drawer, so they never enter this calculation.
    pub fn reconcile(&self, cash_total: Money, closing: Money) -> ShiftReconciliation {
        let expected = self.opening_balance() + cash_total;
        ShiftReconciliation {
            expected,
            variance: closing - expected,
        }
    }
}

// =============================================================================
// Membership Type
// =============================================================================

/// The package a customer bought.
///
/// Subscription packages (monthly through annual) entitle the holder to
/// free washes while unexpired. `Regular` is a loyalty record only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum MembershipType {
    /// Loyalty registration only. Never grants free washes.
    Regular,
    Monthly,
    Quarterly,
    Biannual,
    Annual,
}

impl MembershipType {
    /// Package length in days, used to derive `end_date` from `start_date`.
    ///
    /// Regular memberships get ten years so the record effectively
    /// never expires.
    #[inline]
    pub const fn duration_days(&self) -> i64 {
        match self {
            MembershipType::Regular => 3650,
            MembershipType::Monthly => 30,
            MembershipType::Quarterly => 90,
            MembershipType::Biannual => 180,
            MembershipType::Annual => 365,
        }
    }

    /// Whether this package type can ever grant free washes.
    #[inline]
    pub const fn is_subscription(&self) -> bool {
        !matches!(self, MembershipType::Regular)
    }
}

// =============================================================================
// Membership Status
// =============================================================================

/// Derived lifecycle state of a membership. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// More than seven days remaining.
    Active,
    /// One to seven days remaining.
    ExpiringSoon,
    /// Zero or fewer days remaining.
    Expired,
}

// =============================================================================
// Membership
// =============================================================================

/// A membership record tied to one customer.
///
/// A customer may hold several (e.g. an old expired monthly plus a
/// current annual); entitlement resolution picks among them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Membership {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub customer_id: String,

    pub membership_type: MembershipType,

    pub start_date: DateTime<Utc>,

    /// Expiry instant. All status math derives from this single field.
    pub end_date: DateTime<Utc>,

    /// Price paid for the package, in whole rupiah.
    pub price_rupiah: i64,

    /// Lifetime redemption count. Incremented by `consume` only.
    pub usage_count: i64,

    /// When the membership last priced a wash.
    pub last_used: Option<DateTime<Utc>>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Whole days until expiry, rounded up, negative once expired.
    ///
    /// Any fraction of a remaining day counts as a full day, so a
    /// membership expiring tonight still reports 1 day left. Callers
    /// that display this clamp at zero; the raw value keeps the
    /// status thresholds exact.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        let secs = (self.end_date - now).num_seconds();
        secs.div_euclid(86_400) + if secs.rem_euclid(86_400) > 0 { 1 } else { 0 }
    }

    /// Derives the membership status at the given instant.
    pub fn status(&self, now: DateTime<Utc>) -> MembershipStatus {
        let days = self.days_remaining(now);
        if days > crate::EXPIRING_SOON_DAYS {
            MembershipStatus::Active
        } else if days >= 1 {
            MembershipStatus::ExpiringSoon
        } else {
            MembershipStatus::Expired
        }
    }

    /// Whether this membership prices washes at zero right now.
    ///
    /// Two conditions, both required: the package must be a subscription
    /// type, and it must not be expired. An expiring-soon membership
    /// still qualifies.
    pub fn grants_entitlement(&self, now: DateTime<Utc>) -> bool {
        self.membership_type.is_subscription() && self.status(now) != MembershipStatus::Expired
    }

    /// Extends the expiry by whole days, stacking on the current end date.
    ///
    /// Extension is always relative to `end_date`, never to `now`, so
    /// renewing early never burns remaining days.
    pub fn extended_end_date(&self, days: i64) -> DateTime<Utc> {
        self.end_date + Duration::days(days)
    }
}

/// Picks which membership should price a wash for a customer.
///
/// Rule: among memberships that currently grant entitlement, take the
/// one expiring soonest; break ties by id so the choice is stable.
/// Burning the shortest-lived entitlement first preserves the longer
/// ones for later.
pub fn pick_entitlement(memberships: &[Membership], now: DateTime<Utc>) -> Option<&Membership> {
    memberships
        .iter()
        .filter(|m| m.grants_entitlement(now))
        .min_by(|a, b| a.end_date.cmp(&b.end_date).then_with(|| a.id.cmp(&b.id)))
}

// =============================================================================
// Membership Usage
// =============================================================================

/// One redemption of a membership for one wash. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MembershipUsage {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub membership_id: String,

    /// The wash service redeemed.
    pub service_id: String,

    /// The kasir who recorded the redemption.
    pub kasir_id: String,

    pub used_at: DateTime<Utc>,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash into the drawer. The only method that affects
    /// shift reconciliation.
    Cash,
    /// Card on an external terminal.
    Card,
    /// QRIS or similar scan-to-pay.
    Qr,
    /// Fully covered by membership entitlement. Total is always zero.
    Subscription,
}

impl PaymentMethod {
    /// Whether this method puts money in the physical drawer.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A completed sale. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-readable invoice number, INV-YYYYMMDD-NNNN, unique.
    pub invoice_number: String,

    /// The open shift this sale was rung under.
    pub shift_id: String,

    pub kasir_id: String,

    /// Optional: walk-ins check out without a customer record.
    pub customer_id: Option<String>,

    pub subtotal_rupiah: i64,

    pub total_rupiah: i64,

    pub payment_method: PaymentMethod,

    pub payment_received_rupiah: i64,

    pub change_rupiah: i64,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_rupiah(self.total_rupiah)
    }
}

// =============================================================================
// Transaction Item
// =============================================================================

/// What kind of thing a transaction line sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    /// A wash service at menu price.
    Service,
    /// A retail product; decrements stock.
    Product,
    /// A wash priced at zero against a membership redemption.
    MemberUsage,
}

/// A line item in a transaction.
/// Uses snapshot pattern to freeze name and price at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub transaction_id: String,

    /// Position within the receipt, starting at 1.
    pub line_no: i64,

    pub line_type: LineType,

    /// The service or product sold (service id for member usage lines).
    pub item_id: String,

    /// Name at time of sale (frozen).
    pub name: String,

    /// Unit price in rupiah at time of sale (frozen). Zero for
    /// member usage lines.
    pub unit_price_rupiah: i64,

    pub quantity: i64,

    /// Redemption backing a member usage line. Unique across all
    /// transactions: one redemption prices at most one line, ever.
    pub usage_id: Option<String>,

    pub notes: Option<String>,
}

impl TransactionItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_rupiah(self.unit_price_rupiah)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_rupiah(self.unit_price_rupiah).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
