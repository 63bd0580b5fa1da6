use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post-delivery return. Approval is tri-state: neither timestamp set means
/// the request is still awaiting review.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "return_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub reason: String,
    pub requested_date: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub refund_initiated: bool,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub refund_amount: Option<Decimal>,
    pub refund_completed: bool,
    pub is_order_reached_seller: bool,
    pub returned_to_seller_at: Option<DateTime<Utc>>,
    pub is_stock_updated: bool,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_approved(&self) -> bool {
        self.approved_at.is_some()
    }

    pub fn is_processed(&self) -> bool {
        self.approved_at.is_some() || self.rejected_at.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
