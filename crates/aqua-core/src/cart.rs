//! # Cart Module
//!
//! Pure checkout math: line totals, subtotal, and payment settlement.
//!
//! ## Line Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartLine is a sum type, and the variants are not symmetric:            │
//! │                                                                         │
//! │    Service      { service_id, name, unit_price, quantity }              │
//! │    Product      { product_id, name, unit_price, quantity }              │
//! │    MemberUsage  { service_id, name, usage_id }                          │
//! │                                                                         │
//! │  A member usage line HAS NO price or quantity field. A free wash        │
//! │  cannot be mispriced because there is nowhere to put a price.           │
//! │  The usage_id is the proof that `consume` really ran.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Settlement
//! `total = subtotal` (no tax or discounts at the counter). A zero total
//! means the cart was entirely covered by membership, and the payment
//! method is forced to `subscription` regardless of what the register sent.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{LineType, PaymentMethod};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One line of a checkout request.
///
/// Wire shape is tagged: `{"lineType": "service", "serviceId": ...}`.
/// Member-usage lines carry no price or quantity at all, so a free
/// wash cannot arrive mispriced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "lineType",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum CartLine {
    /// A wash service at menu price.
    Service {
        service_id: String,
        name: String,
        unit_price_rupiah: i64,
        quantity: i64,
    },
    /// A retail product. Stock is decremented at checkout.
    Product {
        product_id: String,
        name: String,
        unit_price_rupiah: i64,
        quantity: i64,
    },
    /// A wash redeemed against a membership. Priced at zero by
    /// construction; `usage_id` references the redemption record.
    MemberUsage {
        service_id: String,
        name: String,
        usage_id: String,
    },
}

impl CartLine {
    /// The kind of line, as stored on the transaction item.
    pub fn line_type(&self) -> LineType {
        match self {
            CartLine::Service { .. } => LineType::Service,
            CartLine::Product { .. } => LineType::Product,
            CartLine::MemberUsage { .. } => LineType::MemberUsage,
        }
    }

    /// The catalog id this line refers to (service id for member usage).
    pub fn item_id(&self) -> &str {
        match self {
            CartLine::Service { service_id, .. } => service_id,
            CartLine::Product { product_id, .. } => product_id,
            CartLine::MemberUsage { service_id, .. } => service_id,
        }
    }

    /// Display name frozen onto the receipt.
    pub fn name(&self) -> &str {
        match self {
            CartLine::Service { name, .. } => name,
            CartLine::Product { name, .. } => name,
            CartLine::MemberUsage { name, .. } => name,
        }
    }

    /// Unit price. Zero for member usage lines.
    pub fn unit_price(&self) -> Money {
        match self {
            CartLine::Service {
                unit_price_rupiah, ..
            } => Money::from_rupiah(*unit_price_rupiah),
            CartLine::Product {
                unit_price_rupiah, ..
            } => Money::from_rupiah(*unit_price_rupiah),
            CartLine::MemberUsage { .. } => Money::zero(),
        }
    }

    /// Quantity. Always 1 for member usage lines.
    pub fn quantity(&self) -> i64 {
        match self {
            CartLine::Service { quantity, .. } => *quantity,
            CartLine::Product { quantity, .. } => *quantity,
            CartLine::MemberUsage { .. } => 1,
        }
    }

    /// The redemption proof, present only on member usage lines.
    pub fn usage_id(&self) -> Option<&str> {
        match self {
            CartLine::MemberUsage { usage_id, .. } => Some(usage_id),
            _ => None,
        }
    }

    /// unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity())
    }
}

// =============================================================================
// Cart Validation
// =============================================================================

/// Validates a cart before checkout touches the database.
///
/// Checks: cart not empty and within size limits, every line named,
/// quantities in 1..=999, prices not negative, ids present, and no
/// usage id claimed twice within the same cart.
pub fn validate_lines(lines: &[CartLine]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    if lines.len() > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        }
        .into());
    }

    let mut seen_usage_ids: Vec<&str> = Vec::new();

    for line in lines {
        if line.item_id().trim().is_empty() {
            return Err(ValidationError::required("itemId").into());
        }
        if line.name().trim().is_empty() {
            return Err(ValidationError::required("name").into());
        }

        let qty = line.quantity();
        if qty < 1 || qty > MAX_ITEM_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_ITEM_QUANTITY,
            }
            .into());
        }

        if line.unit_price().is_negative() {
            return Err(ValidationError::must_not_be_negative("unitPrice").into());
        }

        if let Some(usage_id) = line.usage_id() {
            if usage_id.trim().is_empty() {
                return Err(ValidationError::required("usageId").into());
            }
            if seen_usage_ids.contains(&usage_id) {
                return Err(ValidationError::Duplicate {
                    field: "usageId".to_string(),
                }
                .into());
            }
            seen_usage_ids.push(usage_id);
        }
    }

    Ok(())
}

/// Sums line totals. Member usage lines contribute zero.
pub fn subtotal(lines: &[CartLine]) -> Money {
    lines.iter().map(CartLine::line_total).sum()
}

// =============================================================================
// Payment Settlement
// =============================================================================

/// The settled money figures for a checkout, ready to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub subtotal: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub payment_received: Money,
    pub change: Money,
}

/// Settles payment against a cart subtotal.
///
/// - `total = subtotal` (no counter-level tax or discount)
/// - zero total forces `subscription` / 0 / 0, whatever the caller sent
/// - otherwise the tendered amount must cover the total
pub fn settle_payment(
    subtotal: Money,
    payment_method: PaymentMethod,
    payment_received: Money,
) -> CoreResult<Settlement> {
    if payment_received.is_negative() {
        return Err(ValidationError::must_not_be_negative("paymentReceived").into());
    }

    let total = subtotal;

    if total.is_zero() {
        return Ok(Settlement {
            subtotal,
            total,
            payment_method: PaymentMethod::Subscription,
            payment_received: Money::zero(),
            change: Money::zero(),
        });
    }

    if payment_received < total {
        return Err(CoreError::InsufficientPayment {
            required: total.rupiah(),
            received: payment_received.rupiah(),
        });
    }

    Ok(Settlement {
        subtotal,
        total,
        payment_method,
        payment_received,
        change: payment_received - total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn wash_line(price: i64) -> CartLine {
        CartLine::Service {
            service_id: "svc-1".to_string(),
            name: "Exterior Wash".to_string(),
            unit_price_rupiah: price,
            quantity: 1,
        }
    }

    fn product_line(price: i64, qty: i64) -> CartLine {
        CartLine::Product {
            product_id: "prd-1".to_string(),
            name: "Car Shampoo".to_string(),
            unit_price_rupiah: price,
            quantity: qty,
        }
    }

    fn usage_line(usage_id: &str) -> CartLine {
        CartLine::MemberUsage {
            service_id: "svc-1".to_string(),
            name: "Exterior Wash".to_string(),
            usage_id: usage_id.to_string(),
        }
    }

    #[test]
    fn test_member_usage_line_is_free_by_construction() {
        let line = usage_line("u-1");
        assert!(line.unit_price().is_zero());
        assert_eq!(line.quantity(), 1);
        assert!(line.line_total().is_zero());
        assert_eq!(line.usage_id(), Some("u-1"));
    }

    #[test]
    fn test_subtotal_mixes_paid_and_free_lines() {
        let lines = vec![wash_line(50_000), product_line(15_000, 2), usage_line("u-1")];
        assert_eq!(subtotal(&lines).rupiah(), 80_000);
    }

    #[test]
    fn test_validate_rejects_empty_cart() {
        assert_eq!(validate_lines(&[]), Err(CoreError::EmptyCart));
    }

    #[test]
    fn test_validate_rejects_oversized_cart() {
        let lines: Vec<CartLine> = (0..=MAX_CART_ITEMS).map(|_| wash_line(50_000)).collect();
        assert!(matches!(
            validate_lines(&lines),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_validate_quantity_bounds() {
        let too_many = vec![product_line(15_000, MAX_ITEM_QUANTITY + 1)];
        assert!(validate_lines(&too_many).is_err());

        let zero = vec![product_line(15_000, 0)];
        assert!(validate_lines(&zero).is_err());

        let max_ok = vec![product_line(15_000, MAX_ITEM_QUANTITY)];
        assert!(validate_lines(&max_ok).is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let lines = vec![wash_line(-1)];
        assert!(matches!(
            validate_lines(&lines),
            Err(CoreError::Validation(ValidationError::MustNotBeNegative { .. }))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_usage_in_one_cart() {
        let lines = vec![usage_line("u-1"), usage_line("u-1")];
        assert!(matches!(
            validate_lines(&lines),
            Err(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));

        let distinct = vec![usage_line("u-1"), usage_line("u-2")];
        assert!(validate_lines(&distinct).is_ok());
    }

    #[test]
    fn test_settle_exact_cash() {
        let s = settle_payment(
            Money::from_rupiah(50_000),
            PaymentMethod::Cash,
            Money::from_rupiah(50_000),
        )
        .unwrap();

        assert_eq!(s.total.rupiah(), 50_000);
        assert_eq!(s.payment_method, PaymentMethod::Cash);
        assert!(s.change.is_zero());
    }

    #[test]
    fn test_settle_returns_change() {
        let s = settle_payment(
            Money::from_rupiah(80_000),
            PaymentMethod::Cash,
            Money::from_rupiah(100_000),
        )
        .unwrap();

        assert_eq!(s.change.rupiah(), 20_000);
    }

    #[test]
    fn test_settle_rejects_underpayment() {
        let err = settle_payment(
            Money::from_rupiah(50_000),
            PaymentMethod::Cash,
            Money::from_rupiah(30_000),
        )
        .unwrap_err();

        assert_eq!(
            err,
            CoreError::InsufficientPayment {
                required: 50_000,
                received: 30_000,
            }
        );
    }

    #[test]
    fn test_zero_total_forces_subscription() {
        // Register claims cash with money tendered; a fully-covered cart
        // overrides all of it
        let s = settle_payment(
            Money::zero(),
            PaymentMethod::Cash,
            Money::from_rupiah(100_000),
        )
        .unwrap();

        assert_eq!(s.payment_method, PaymentMethod::Subscription);
        assert!(s.total.is_zero());
        assert!(s.payment_received.is_zero());
        assert!(s.change.is_zero());
    }

    #[test]
    fn test_subscription_method_with_paid_lines_still_needs_payment() {
        let err = settle_payment(
            Money::from_rupiah(15_000),
            PaymentMethod::Subscription,
            Money::zero(),
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::InsufficientPayment { .. }));
    }

    #[test]
    fn test_negative_tender_rejected() {
        let err = settle_payment(
            Money::from_rupiah(50_000),
            PaymentMethod::Cash,
            Money::from_rupiah(-1),
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
    }
}
