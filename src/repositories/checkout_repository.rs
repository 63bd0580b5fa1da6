use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::commerce::checkout_session::{self, CheckoutStatus, Entity as CheckoutSession};
use crate::errors::ServiceError;

pub struct CheckoutRepository;

impl CheckoutRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<checkout_session::Model>, ServiceError> {
        Ok(CheckoutSession::find_by_id(id).one(conn).await?)
    }

    /// The user's live session, if any. Newest wins should duplicates exist.
    pub async fn find_pending_by_user<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> Result<Option<checkout_session::Model>, ServiceError> {
        Ok(CheckoutSession::find()
            .filter(checkout_session::Column::UserId.eq(user_id))
            .filter(checkout_session::Column::Status.eq(CheckoutStatus::Pending))
            .order_by_desc(checkout_session::Column::CreatedAt)
            .one(conn)
            .await?)
    }

    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        total_amount: Decimal,
        item_count: i32,
    ) -> Result<checkout_session::Model, ServiceError> {
        let now = Utc::now();
        let session = checkout_session::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            total_amount: Set(total_amount),
            discount_amount: Set(Decimal::ZERO),
            final_amount: Set(total_amount),
            item_count: Set(item_count),
            coupon_code: Set(None),
            coupon_applied: Set(false),
            shipping_address_id: Set(None),
            status: Set(CheckoutStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(session.insert(conn).await?)
    }

    pub async fn update<C: ConnectionTrait>(
        conn: &C,
        mut session: checkout_session::ActiveModel,
    ) -> Result<checkout_session::Model, ServiceError> {
        session.updated_at = Set(Utc::now());
        Ok(session.update(conn).await?)
    }

    /// Drops any coupon from the user's pending sessions. Returns how many
    /// sessions lost one.
    pub async fn clear_pending_coupon<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> Result<u64, ServiceError> {
        let result = CheckoutSession::update_many()
            .col_expr(checkout_session::Column::DiscountAmount, Expr::value(Decimal::ZERO))
            .col_expr(
                checkout_session::Column::FinalAmount,
                Expr::col(checkout_session::Column::TotalAmount).into(),
            )
            .col_expr(checkout_session::Column::CouponCode, Expr::value(Option::<String>::None))
            .col_expr(checkout_session::Column::CouponApplied, Expr::value(false))
            .col_expr(checkout_session::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(checkout_session::Column::UserId.eq(user_id))
            .filter(checkout_session::Column::Status.eq(CheckoutStatus::Pending))
            .filter(checkout_session::Column::CouponApplied.eq(true))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}
