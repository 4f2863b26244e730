//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Shift reconciliation compares counted cash against a running sum       │
//! │  of sale totals. A single rounding drift turns an honest drawer        │
//! │  into a phantom shortage.                                               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Rupiah                                           │
//! │    IDR has no fractional unit in practice, so every amount is a        │
//! │    whole-rupiah i64. Sums, change, and variance are exact.             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use aqua_core::money::Money;
//!
//! // Create from whole rupiah (the only constructor)
//! let price = Money::from_rupiah(50_000); // Rp 50.000
//!
//! // Arithmetic operations
//! let doubled = price * 2;                        // Rp 100.000
//! let total = price + Money::from_rupiah(25_000); // Rp 75.000
//!
//! // NEVER do this:
//! // let bad = Money::from_float(50000.0); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in whole Indonesian rupiah.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for cash-drawer variance
///   (a short drawer is a negative number, not an error)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Service.price_rupiah ──► CartLine ──► line_total ──► subtotal/total   │
/// │                                                                         │
/// │  Transaction.total ──► Shift cash sum ──► expected_balance             │
/// │                                                                         │
/// │  closing_balance − expected_balance ──► variance (may be negative)     │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole rupiah.
    ///
    /// ## Example
    /// ```rust
    /// use aqua_core::money::Money;
    ///
    /// let price = Money::from_rupiah(50_000);
    /// assert_eq!(price.rupiah(), 50_000);
    /// ```
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah)
    }

    /// Returns the value in whole rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    ///
    /// ## Example
    /// ```rust
    /// use aqua_core::money::Money;
    ///
    /// let zero = Money::zero();
    /// assert_eq!(zero.rupiah(), 0);
    /// assert!(zero.is_zero());
    /// ```
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    ///
    /// ## Example
    /// ```rust
    /// use aqua_core::money::Money;
    ///
    /// let shortfall = Money::from_rupiah(-5_000);
    /// assert_eq!(shortfall.abs().rupiah(), 5_000);
    /// ```
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use aqua_core::money::Money;
    ///
    /// let unit_price = Money::from_rupiah(15_000);
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.rupiah(), 45_000);
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Product: Car Shampoo Rp 15.000
    /// Quantity: 3
    ///      │
    ///      ▼
    /// multiply_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: Rp 45.000
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for receipts and logs. Uses Indonesian thousands grouping:
/// `Rp 1.500.000`, negative amounts as `-Rp 5.000`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp {}", sign, group_thousands(self.0.abs()))
    }
}

/// Groups digits in threes with `.` separators (id-ID convention).
fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summing an iterator of Money values (cart subtotals, cash totals).
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rupiah() {
        let money = Money::from_rupiah(50_000);
        assert_eq!(money.rupiah(), 50_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_rupiah(50_000)), "Rp 50.000");
        assert_eq!(format!("{}", Money::from_rupiah(1_500_000)), "Rp 1.500.000");
        assert_eq!(format!("{}", Money::from_rupiah(500)), "Rp 500");
        assert_eq!(format!("{}", Money::from_rupiah(-5_000)), "-Rp 5.000");
        assert_eq!(format!("{}", Money::from_rupiah(0)), "Rp 0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupiah(100_000);
        let b = Money::from_rupiah(50_000);

        assert_eq!((a + b).rupiah(), 150_000);
        assert_eq!((a - b).rupiah(), 50_000);
        let result: Money = a * 3;
        assert_eq!(result.rupiah(), 300_000);
    }

    #[test]
    fn test_variance_can_go_negative() {
        // Drawer counted short: closing < expected
        let expected = Money::from_rupiah(150_000);
        let closing = Money::from_rupiah(140_000);
        let variance = closing - expected;

        assert!(variance.is_negative());
        assert_eq!(variance.rupiah(), -10_000);
        assert_eq!(variance.abs().rupiah(), 10_000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_rupiah(100);
        assert!(!positive.is_zero());
        assert!(positive.is_positive());
        assert!(!positive.is_negative());

        let negative = Money::from_rupiah(-100);
        assert!(!negative.is_zero());
        assert!(!negative.is_positive());
        assert!(negative.is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_rupiah(15_000);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.rupiah(), 45_000);
    }

    #[test]
    fn test_sum_iterator() {
        let totals = vec![
            Money::from_rupiah(50_000),
            Money::from_rupiah(35_000),
            Money::zero(),
            Money::from_rupiah(15_000),
        ];
        let sum: Money = totals.into_iter().sum();
        assert_eq!(sum.rupiah(), 100_000);

        let empty: Money = std::iter::empty::<Money>().sum();
        assert!(empty.is_zero());
    }
}
