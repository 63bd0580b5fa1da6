use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::entities::commerce::coupon::{self, Entity as Coupon};
use crate::errors::ServiceError;

use super::page_index;

pub struct CouponRepository;

impl CouponRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<coupon::Model>, ServiceError> {
        Ok(Coupon::find_by_id(id).one(conn).await?)
    }

    /// Codes are stored upper-cased, so callers pass the normalized form.
    pub async fn find_by_code<C: ConnectionTrait>(
        conn: &C,
        code: &str,
    ) -> Result<Option<coupon::Model>, ServiceError> {
        Ok(Coupon::find()
            .filter(coupon::Column::Code.eq(code))
            .one(conn)
            .await?)
    }

    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<coupon::Model>, u64), ServiceError> {
        let paginator = Coupon::find()
            .order_by_desc(coupon::Column::CreatedAt)
            .paginate(conn, per_page);
        let total = paginator.num_items().await?;
        let coupons = paginator.fetch_page(page_index(page)).await?;
        Ok((coupons, total))
    }

    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        coupon: coupon::ActiveModel,
    ) -> Result<coupon::Model, ServiceError> {
        Ok(coupon.insert(conn).await?)
    }

    pub async fn update<C: ConnectionTrait>(
        conn: &C,
        coupon: coupon::ActiveModel,
    ) -> Result<coupon::Model, ServiceError> {
        Ok(coupon.update(conn).await?)
    }
}
