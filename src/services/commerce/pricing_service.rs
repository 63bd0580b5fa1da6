//! Checkout pricing: line totals and single-coupon discounts.
//!
//! Everything here is pure; callers load carts and coupons and persist the
//! resulting amounts themselves.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::entities::commerce::coupon;
use crate::errors::CouponError;

/// Rounds to the 2 decimal places money is stored with.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub total_amount: Decimal,
    /// Sum of quantities, not the number of distinct lines
    pub item_count: i32,
}

/// Sums `quantity × unit price` over `(quantity, unit_price)` lines.
pub fn compute_totals<I>(lines: I) -> CheckoutTotals
where
    I: IntoIterator<Item = (i32, Decimal)>,
{
    let (total, count) = lines
        .into_iter()
        .fold((Decimal::ZERO, 0i32), |(total, count), (quantity, price)| {
            (total + price * Decimal::from(quantity), count + quantity)
        });
    CheckoutTotals {
        total_amount: round_money(total),
        item_count: count,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponQuote {
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    /// The percentage discount exceeded the cap and was clamped to it
    pub capped: bool,
}

impl CouponQuote {
    pub fn message(&self, max_discount: Decimal) -> Option<String> {
        self.capped.then(|| {
            format!(
                "Discount capped at the maximum of {}",
                max_discount.normalize()
            )
        })
    }
}

/// Prices `coupon` against `total_amount` at `now`.
pub fn quote_coupon(
    total_amount: Decimal,
    coupon: &coupon::Model,
    now: DateTime<Utc>,
    max_discount: Decimal,
) -> Result<CouponQuote, CouponError> {
    if !coupon.is_active {
        return Err(CouponError::CouponInactive);
    }
    if coupon.is_expired_at(now) {
        return Err(CouponError::CouponExpired);
    }
    if total_amount < coupon.min_order_amount {
        return Err(CouponError::OrderTotalBelowMinimum {
            minimum: coupon.min_order_amount,
        });
    }

    let raw = round_money(total_amount * coupon.discount_percentage / Decimal::ONE_HUNDRED);
    let capped = raw > max_discount;
    let discount_amount = if capped { max_discount } else { raw };

    Ok(CouponQuote {
        discount_amount,
        final_amount: round_money(total_amount - discount_amount),
        capped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use test_case::test_case;
    use uuid::Uuid;

    fn coupon(pct: Decimal, min: Decimal) -> coupon::Model {
        let now = Utc::now();
        coupon::Model {
            id: Uuid::new_v4(),
            code: "SAVE".into(),
            discount_percentage: pct,
            min_order_amount: min,
            is_active: true,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn totals_sum_lines_and_quantities() {
        let totals = compute_totals([(2, dec!(100)), (1, dec!(49.99))]);
        assert_eq!(totals.total_amount, dec!(249.99));
        assert_eq!(totals.item_count, 3);
    }

    #[test]
    fn totals_of_empty_cart_are_zero() {
        let totals = compute_totals(Vec::new());
        assert_eq!(totals.total_amount, Decimal::ZERO);
        assert_eq!(totals.item_count, 0);
    }

    #[test]
    fn totals_round_to_cents() {
        let totals = compute_totals([(3, dec!(0.335))]);
        assert_eq!(totals.total_amount, dec!(1.01));
    }

    #[test_case(dec!(500), dec!(10), dec!(50), dec!(450) ; "ten percent")]
    #[test_case(dec!(199.99), dec!(15), dec!(30.00), dec!(169.99) ; "rounds half away from zero")]
    #[test_case(dec!(80), dec!(100), dec!(80), dec!(0) ; "full discount")]
    fn discount_applies_percentage(total: Decimal, pct: Decimal, discount: Decimal, final_amount: Decimal) {
        let quote = quote_coupon(total, &coupon(pct, dec!(0)), Utc::now(), dec!(5000)).unwrap();
        assert_eq!(quote.discount_amount, discount);
        assert_eq!(quote.final_amount, final_amount);
        assert!(!quote.capped);
        assert_eq!(quote.message(dec!(5000)), None);
    }

    #[test]
    fn discount_is_capped_with_message() {
        let quote = quote_coupon(dec!(100000), &coupon(dec!(20), dec!(0)), Utc::now(), dec!(5000)).unwrap();
        assert_eq!(quote.discount_amount, dec!(5000));
        assert_eq!(quote.final_amount, dec!(95000));
        assert!(quote.capped);
        assert_eq!(
            quote.message(dec!(5000)).as_deref(),
            Some("Discount capped at the maximum of 5000")
        );
    }

    #[test]
    fn discount_exactly_at_cap_is_not_flagged() {
        let quote = quote_coupon(dec!(50000), &coupon(dec!(10), dec!(0)), Utc::now(), dec!(5000)).unwrap();
        assert_eq!(quote.discount_amount, dec!(5000));
        assert!(!quote.capped);
    }

    #[test]
    fn inactive_coupon_is_rejected() {
        let mut c = coupon(dec!(10), dec!(0));
        c.is_active = false;
        assert_matches!(
            quote_coupon(dec!(100), &c, Utc::now(), dec!(5000)),
            Err(CouponError::CouponInactive)
        );
    }

    #[test]
    fn expired_coupon_is_rejected() {
        let now = Utc::now();
        let mut c = coupon(dec!(10), dec!(0));
        c.expires_at = Some(now - Duration::minutes(1));
        assert_matches!(
            quote_coupon(dec!(100), &c, now, dec!(5000)),
            Err(CouponError::CouponExpired)
        );

        c.expires_at = Some(now + Duration::days(1));
        assert!(quote_coupon(dec!(100), &c, now, dec!(5000)).is_ok());
    }

    #[test]
    fn total_below_minimum_is_rejected() {
        let c = coupon(dec!(10), dec!(500));
        assert_matches!(
            quote_coupon(dec!(499.99), &c, Utc::now(), dec!(5000)),
            Err(CouponError::OrderTotalBelowMinimum { minimum }) if minimum == dec!(500)
        );
        assert!(quote_coupon(dec!(500), &c, Utc::now(), dec!(5000)).is_ok());
    }
}
