use crate::{
    entities::commerce::coupon,
    errors::{CouponError, ServiceError},
    repositories::CouponRepository,
    services::commerce::checkout_service::normalize_code,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCouponInput {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    pub discount_percentage: Decimal,
    #[serde(default)]
    pub min_order_amount: Decimal,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCouponInput {
    pub discount_percentage: Option<Decimal>,
    pub min_order_amount: Option<Decimal>,
    /// `Some(None)` clears the expiry
    #[serde(default, with = "double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Percentage must be in (0, 100].
fn check_percentage(pct: Decimal) -> Result<(), CouponError> {
    if pct <= Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
        return Err(CouponError::InvalidDiscountPercentage);
    }
    Ok(())
}

fn check_minimum(min: Decimal) -> Result<(), CouponError> {
    if min < Decimal::ZERO {
        return Err(CouponError::InvalidMinimumOrderAmount);
    }
    Ok(())
}

/// Coupon administration
#[derive(Clone)]
pub struct CouponService {
    db: Arc<DatabaseConnection>,
}

impl CouponService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_coupon(&self, input: CreateCouponInput) -> Result<coupon::Model, ServiceError> {
        check_percentage(input.discount_percentage)?;
        check_minimum(input.min_order_amount)?;

        let code = normalize_code(&input.code);
        if CouponRepository::find_by_code(&*self.db, &code).await?.is_some() {
            return Err(CouponError::CouponCodeTaken(code).into());
        }

        let now = Utc::now();
        let coupon = CouponRepository::create(
            &*self.db,
            coupon::ActiveModel {
                id: Set(Uuid::new_v4()),
                code: Set(code),
                discount_percentage: Set(input.discount_percentage),
                min_order_amount: Set(input.min_order_amount),
                is_active: Set(input.is_active),
                expires_at: Set(input.expires_at),
                created_at: Set(now),
                updated_at: Set(now),
            },
        )
        .await?;

        info!(coupon_id = %coupon.id, code = %coupon.code, "coupon created");
        Ok(coupon)
    }

    #[instrument(skip(self))]
    pub async fn update_coupon(
        &self,
        id: Uuid,
        input: UpdateCouponInput,
    ) -> Result<coupon::Model, ServiceError> {
        let coupon = self.get_coupon(id).await?;
        let mut active: coupon::ActiveModel = coupon.into();

        if let Some(pct) = input.discount_percentage {
            check_percentage(pct)?;
            active.discount_percentage = Set(pct);
        }
        if let Some(min) = input.min_order_amount {
            check_minimum(min)?;
            active.min_order_amount = Set(min);
        }
        if let Some(expires_at) = input.expires_at {
            active.expires_at = Set(expires_at);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        CouponRepository::update(&*self.db, active).await
    }

    #[instrument(skip(self))]
    pub async fn deactivate_coupon(&self, id: Uuid) -> Result<coupon::Model, ServiceError> {
        self.update_coupon(
            id,
            UpdateCouponInput {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn get_coupon(&self, id: Uuid) -> Result<coupon::Model, ServiceError> {
        CouponRepository::find_by_id(&*self.db, id)
            .await?
            .ok_or_else(|| CouponError::CouponNotFound.into())
    }

    pub async fn list_coupons(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<coupon::Model>, u64), ServiceError> {
        CouponRepository::list(&*self.db, page, per_page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    #[test_case(dec!(0.01) ; "smallest positive")]
    #[test_case(dec!(50) ; "half")]
    #[test_case(dec!(100) ; "full")]
    fn accepts_percentages_in_range(pct: Decimal) {
        assert!(check_percentage(pct).is_ok());
    }

    #[test_case(dec!(0) ; "zero")]
    #[test_case(dec!(-5) ; "negative")]
    #[test_case(dec!(100.01) ; "above full")]
    fn rejects_percentages_out_of_range(pct: Decimal) {
        assert_eq!(check_percentage(pct), Err(CouponError::InvalidDiscountPercentage));
    }

    #[test]
    fn minimum_may_be_zero_but_not_negative() {
        assert!(check_minimum(dec!(0)).is_ok());
        assert_eq!(check_minimum(dec!(-1)), Err(CouponError::InvalidMinimumOrderAmount));
    }

    #[test]
    fn update_distinguishes_missing_and_null_expiry() {
        let missing: UpdateCouponInput = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.expires_at, None);

        let cleared: UpdateCouponInput = serde_json::from_str(r#"{"expires_at": null}"#).unwrap();
        assert_eq!(cleared.expires_at, Some(None));
    }
}
