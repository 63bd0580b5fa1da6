use crate::{
    db::UnitOfWork,
    entities::commerce::cart_item,
    errors::{CartError, InventoryError, ServiceError},
    repositories::{CartRepository, CheckoutRepository, ProductRepository},
    services::commerce::pricing_service::{compute_totals, round_money},
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddToCartInput {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCartItemInput {
    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,
}

/// One cart line priced at the product's current price.
///
/// A line whose product was deleted keeps the price it was added at and is
/// marked unavailable; it counts toward no total and blocks checkout until
/// removed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CartLine {
    pub item_id: Uuid,
    pub product_id: Uuid,
    pub name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub user_id: Uuid,
    pub items: Vec<CartLine>,
    pub total_amount: Decimal,
    pub item_count: i32,
}

/// Shopping cart store: one line per (user, product).
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn get_cart(&self, user_id: Uuid) -> Result<CartView, ServiceError> {
        let rows = CartRepository::items_with_products(&*self.db, user_id).await?;
        let items: Vec<CartLine> = rows
            .into_iter()
            .map(|(item, product)| {
                let available = product.as_ref().map_or(false, |p| p.is_available());
                let unit_price = match &product {
                    Some(p) if available => p.price,
                    _ => item.price,
                };
                CartLine {
                    item_id: item.id,
                    product_id: item.product_id,
                    name: product.map(|p| p.name),
                    quantity: item.quantity,
                    unit_price,
                    subtotal: round_money(unit_price * Decimal::from(item.quantity)),
                    available,
                }
            })
            .collect();
        let totals = compute_totals(
            items
                .iter()
                .filter(|l| l.available)
                .map(|l| (l.quantity, l.unit_price)),
        );

        Ok(CartView {
            user_id,
            items,
            total_amount: totals.total_amount,
            item_count: totals.item_count,
        })
    }

    /// Adds `quantity` of a product, merging with an existing line.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        input: AddToCartInput,
    ) -> Result<cart_item::Model, ServiceError> {
        if input.quantity < 1 {
            return Err(CartError::InvalidQuantity.into());
        }

        let uow = UnitOfWork::begin(&self.db, "cart_add_item").await?;
        let result: Result<cart_item::Model, ServiceError> = async {
            let conn = uow.conn();
            let product = ProductRepository::find_by_id(conn, input.product_id)
                .await?
                .ok_or(InventoryError::ProductNotFound(input.product_id))?;
            if !product.is_available() {
                return Err(InventoryError::ProductUnavailable(product.id).into());
            }

            let existing = CartRepository::find_item(conn, user_id, product.id).await?;
            let quantity = existing.as_ref().map_or(0, |i| i.quantity) + input.quantity;
            if quantity > product.stock_quantity {
                return Err(InventoryError::InsufficientStock {
                    product_id: product.id,
                    requested: quantity,
                    available: product.stock_quantity,
                }
                .into());
            }

            let item = match existing {
                Some(item) => {
                    CartRepository::update_quantity(conn, item, quantity, product.price).await?
                }
                None => {
                    CartRepository::insert(conn, user_id, product.id, quantity, product.price)
                        .await?
                }
            };
            drop_pending_coupon(conn, user_id).await?;
            Ok(item)
        }
        .await;
        let item = uow.finish(result).await?;

        info!(%user_id, product_id = %item.product_id, quantity = item.quantity, "cart item saved");
        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        input: UpdateCartItemInput,
    ) -> Result<cart_item::Model, ServiceError> {
        if input.quantity < 1 {
            return Err(CartError::InvalidQuantity.into());
        }

        let uow = UnitOfWork::begin(&self.db, "cart_update_item").await?;
        let result: Result<cart_item::Model, ServiceError> = async {
            let conn = uow.conn();
            let item = CartRepository::find_by_id(conn, item_id)
                .await?
                .filter(|i| i.user_id == user_id)
                .ok_or(CartError::CartItemNotFound)?;
            let product = ProductRepository::find_by_id(conn, item.product_id)
                .await?
                .filter(|p| p.is_available())
                .ok_or(InventoryError::ProductUnavailable(item.product_id))?;
            if input.quantity > product.stock_quantity {
                return Err(InventoryError::InsufficientStock {
                    product_id: product.id,
                    requested: input.quantity,
                    available: product.stock_quantity,
                }
                .into());
            }
            let item =
                CartRepository::update_quantity(conn, item, input.quantity, product.price).await?;
            drop_pending_coupon(conn, user_id).await?;
            Ok(item)
        }
        .await;
        uow.finish(result).await
    }

    /// Unavailable lines can always be removed.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "cart_remove_item").await?;
        let result: Result<(), ServiceError> = async {
            let conn = uow.conn();
            let item = CartRepository::find_by_id(conn, item_id)
                .await?
                .filter(|i| i.user_id == user_id)
                .ok_or(CartError::CartItemNotFound)?;
            CartRepository::delete(conn, item).await?;
            drop_pending_coupon(conn, user_id).await
        }
        .await;
        uow.finish(result).await?;

        info!(%user_id, %item_id, "cart item removed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "cart_clear").await?;
        let result: Result<u64, ServiceError> = async {
            let conn = uow.conn();
            let removed = CartRepository::clear(conn, user_id).await?;
            drop_pending_coupon(conn, user_id).await?;
            Ok(removed)
        }
        .await;
        uow.finish(result).await
    }
}

/// A coupon was quoted against the cart as it stood; any edit voids it,
/// even one that leaves the total unchanged.
async fn drop_pending_coupon<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<(), ServiceError> {
    let cleared = CheckoutRepository::clear_pending_coupon(conn, user_id).await?;
    if cleared > 0 {
        debug!(%user_id, "cart edited, coupon dropped from pending checkout");
    }
    Ok(())
}
