//! Stock checks and movements that ride along with order mutations.

use sea_orm::ConnectionTrait;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entities::product;
use crate::errors::{InventoryError, ServiceError};
use crate::repositories::ProductRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl StockLine {
    pub fn new(product_id: Uuid, quantity: i32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Merges duplicate products so each is checked and moved once.
fn merge(lines: &[StockLine]) -> BTreeMap<Uuid, i32> {
    let mut merged = BTreeMap::new();
    for line in lines {
        *merged.entry(line.product_id).or_insert(0) += line.quantity;
    }
    merged
}

pub struct InventoryGuard;

impl InventoryGuard {
    /// Fails on the first product that is missing, deleted or short of stock.
    pub async fn validate_stock<C: ConnectionTrait>(
        conn: &C,
        lines: &[StockLine],
    ) -> Result<HashMap<Uuid, product::Model>, ServiceError> {
        let wanted = merge(lines);
        let ids: Vec<Uuid> = wanted.keys().copied().collect();
        let products = ProductRepository::find_many(conn, &ids).await?;

        for (product_id, requested) in &wanted {
            let product = products
                .get(product_id)
                .ok_or(InventoryError::ProductNotFound(*product_id))?;
            if !product.is_available() {
                return Err(InventoryError::ProductUnavailable(*product_id).into());
            }
            if *requested > product.stock_quantity {
                return Err(InventoryError::InsufficientStock {
                    product_id: *product_id,
                    requested: *requested,
                    available: product.stock_quantity,
                }
                .into());
            }
        }
        Ok(products)
    }

    /// Conditionally decrements every line. Must run inside the caller's
    /// transaction: an error part way leaves earlier lines decremented until
    /// the caller rolls back.
    pub async fn decrement<C: ConnectionTrait>(
        conn: &C,
        lines: &[StockLine],
    ) -> Result<(), ServiceError> {
        for (product_id, quantity) in merge(lines) {
            if !ProductRepository::decrement_stock(conn, product_id, quantity).await? {
                let available = ProductRepository::find_by_id(conn, product_id)
                    .await?
                    .map(|p| p.stock_quantity)
                    .unwrap_or(0);
                warn!(%product_id, quantity, available, "stock decrement rejected");
                return Err(InventoryError::InsufficientStock {
                    product_id,
                    requested: quantity,
                    available,
                }
                .into());
            }
            debug!(%product_id, quantity, "stock decremented");
        }
        Ok(())
    }

    /// Puts stock back. A product row that no longer exists is skipped so a
    /// purged catalog entry cannot block a cancellation or return.
    pub async fn restore<C: ConnectionTrait>(
        conn: &C,
        lines: &[StockLine],
    ) -> Result<(), ServiceError> {
        for (product_id, quantity) in merge(lines) {
            if ProductRepository::restore_stock(conn, product_id, quantity).await? {
                debug!(%product_id, quantity, "stock restored");
            } else {
                warn!(%product_id, quantity, "cannot restore stock for missing product");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_adds_duplicate_products() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let merged = merge(&[StockLine::new(a, 2), StockLine::new(b, 1), StockLine::new(a, 3)]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[&a], 5);
        assert_eq!(merged[&b], 1);
    }
}
