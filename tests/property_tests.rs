//! Property tests for checkout pricing.

use chrono::{Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use storefront_api::{
    entities::commerce::CouponModel,
    services::commerce::pricing_service::{compute_totals, quote_coupon, round_money},
    services::returns::within_return_window,
};
use uuid::Uuid;

fn coupon(pct: Decimal) -> CouponModel {
    let now = Utc::now();
    CouponModel {
        id: Uuid::new_v4(),
        code: "PROP".to_string(),
        discount_percentage: pct,
        min_order_amount: Decimal::ZERO,
        is_active: true,
        expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Money with two decimal places, up to ten million.
fn money() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Percentages in (0, 100] with two decimal places.
fn percentage() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000).prop_map(|bp| Decimal::new(bp, 2))
}

proptest! {
    #[test]
    fn discount_never_exceeds_cap_or_total(
        total in money(),
        pct in percentage(),
        cap in (1i64..1_000_000).prop_map(Decimal::from),
    ) {
        let quote = quote_coupon(total, &coupon(pct), Utc::now(), cap).unwrap();

        prop_assert!(quote.discount_amount <= cap);
        prop_assert!(quote.discount_amount <= total);
        prop_assert!(quote.discount_amount >= Decimal::ZERO);
        prop_assert_eq!(quote.final_amount, total - quote.discount_amount);
        prop_assert!(quote.final_amount >= Decimal::ZERO);
        prop_assert_eq!(quote.capped, quote.discount_amount == cap && quote.message(cap).is_some());
    }

    #[test]
    fn capped_flag_matches_raw_discount(total in money(), pct in percentage()) {
        let cap = Decimal::from(5000);
        let quote = quote_coupon(total, &coupon(pct), Utc::now(), cap).unwrap();
        let raw = round_money(total * pct / Decimal::ONE_HUNDRED);

        if raw > cap {
            prop_assert!(quote.capped);
            prop_assert_eq!(quote.discount_amount, cap);
        } else {
            prop_assert!(!quote.capped);
            prop_assert!(quote.message(cap).is_none());
        }
    }

    #[test]
    fn totals_are_order_independent(
        lines in proptest::collection::vec((1i32..20, money()), 0..12),
    ) {
        let forward = compute_totals(lines.clone());
        let mut reversed = lines.clone();
        reversed.reverse();
        let backward = compute_totals(reversed);

        prop_assert_eq!(forward.total_amount, backward.total_amount);
        prop_assert_eq!(forward.item_count, backward.item_count);
        prop_assert_eq!(forward.item_count, lines.iter().map(|(q, _)| *q).sum::<i32>());
    }

    #[test]
    fn return_window_is_monotonic(window_days in 1i64..60, offset_secs in 0i64..(60 * 86_400)) {
        let delivered = Utc::now();
        let window = Duration::days(window_days);
        let now = delivered + Duration::seconds(offset_secs);

        prop_assert_eq!(
            within_return_window(delivered, now, window),
            Duration::seconds(offset_secs) < window
        );
    }
}
