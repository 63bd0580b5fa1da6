use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entities::payment::{self, Entity as Payment};
use crate::errors::ServiceError;

pub struct PaymentRepository;

impl PaymentRepository {
    pub async fn find_by_order<C: ConnectionTrait>(
        conn: &C,
        order_id: Uuid,
    ) -> Result<Option<payment::Model>, ServiceError> {
        Ok(Payment::find()
            .filter(payment::Column::OrderId.eq(order_id))
            .one(conn)
            .await?)
    }

    pub async fn find_by_gateway_order_id<C: ConnectionTrait>(
        conn: &C,
        gateway_order_id: &str,
    ) -> Result<Option<payment::Model>, ServiceError> {
        Ok(Payment::find()
            .filter(payment::Column::GatewayOrderId.eq(gateway_order_id))
            .one(conn)
            .await?)
    }

    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        payment: payment::ActiveModel,
    ) -> Result<payment::Model, ServiceError> {
        Ok(payment.insert(conn).await?)
    }

    pub async fn update<C: ConnectionTrait>(
        conn: &C,
        mut payment: payment::ActiveModel,
    ) -> Result<payment::Model, ServiceError> {
        payment.updated_at = Set(Utc::now());
        Ok(payment.update(conn).await?)
    }
}
