use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::product::{self, Entity as Product};
use crate::errors::ServiceError;

/// Product store as seen by checkout: price, stock and soft-delete marker.
pub struct ProductRepository;

impl ProductRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<product::Model>, ServiceError> {
        Ok(Product::find_by_id(id).one(conn).await?)
    }

    /// Loads the given products keyed by id; missing ids are simply absent.
    pub async fn find_many<C: ConnectionTrait>(
        conn: &C,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, product::Model>, ServiceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let products = Product::find()
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .all(conn)
            .await?;
        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }

    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        name: &str,
        price: Decimal,
        stock_quantity: i32,
    ) -> Result<product::Model, ServiceError> {
        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            price: Set(price),
            stock_quantity: Set(stock_quantity),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(conn).await?)
    }

    /// Takes `quantity` units out of stock only if that many are on hand.
    ///
    /// Returns `false` when the guard rejected the update (not enough stock,
    /// unknown or deleted product); nothing is written in that case.
    pub async fn decrement_stock<C: ConnectionTrait>(
        conn: &C,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<bool, ServiceError> {
        let result = Product::update_many()
            .col_expr(
                product::Column::StockQuantity,
                Expr::col(product::Column::StockQuantity).sub(quantity),
            )
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(product_id))
            .filter(product::Column::StockQuantity.gte(quantity))
            .filter(product::Column::DeletedAt.is_null())
            .exec(conn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    /// Puts `quantity` units back; soft-deleted products are restocked too.
    pub async fn restore_stock<C: ConnectionTrait>(
        conn: &C,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<bool, ServiceError> {
        let result = Product::update_many()
            .col_expr(
                product::Column::StockQuantity,
                Expr::col(product::Column::StockQuantity).add(quantity),
            )
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(product_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected == 1)
    }
}
