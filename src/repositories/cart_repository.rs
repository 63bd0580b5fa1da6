use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::commerce::cart_item::{self, Entity as CartItem};
use crate::entities::product::{self, Entity as Product};
use crate::errors::ServiceError;

pub struct CartRepository;

impl CartRepository {
    /// Cart lines with the product each one points at (if it still exists).
    pub async fn items_with_products<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> Result<Vec<(cart_item::Model, Option<product::Model>)>, ServiceError> {
        Ok(CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .find_also_related(Product)
            .all(conn)
            .await?)
    }

    pub async fn find_item<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<cart_item::Model>, ServiceError> {
        Ok(CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(conn)
            .await?)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<cart_item::Model>, ServiceError> {
        Ok(CartItem::find_by_id(id).one(conn).await?)
    }

    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        price: Decimal,
    ) -> Result<cart_item::Model, ServiceError> {
        let now = Utc::now();
        let item = cart_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            price: Set(price),
            subtotal: Set(price * Decimal::from(quantity)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(item.insert(conn).await?)
    }

    /// Rewrites quantity and refreshes price/subtotal from the live price.
    pub async fn update_quantity<C: ConnectionTrait>(
        conn: &C,
        item: cart_item::Model,
        quantity: i32,
        price: Decimal,
    ) -> Result<cart_item::Model, ServiceError> {
        let mut active: cart_item::ActiveModel = item.into();
        active.quantity = Set(quantity);
        active.price = Set(price);
        active.subtotal = Set(price * Decimal::from(quantity));
        active.updated_at = Set(Utc::now());
        Ok(active.update(conn).await?)
    }

    pub async fn delete<C: ConnectionTrait>(
        conn: &C,
        item: cart_item::Model,
    ) -> Result<(), ServiceError> {
        item.delete(conn).await?;
        Ok(())
    }

    /// Empties the user's cart, returning how many lines were removed.
    pub async fn clear<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<u64, ServiceError> {
        let result = CartItem::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}
