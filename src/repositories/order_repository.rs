use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::cancellation_request::{
    self, CancellationStatus, Entity as CancellationRequest,
};
use crate::entities::order::{self, Entity as Order, OrderStatus};
use crate::entities::order_item::{self, Entity as OrderItem};
use crate::errors::ServiceError;

use super::page_index;

/// Order aggregate: orders, their items and cancellation requests.
pub struct OrderRepository;

impl OrderRepository {
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        order: order::ActiveModel,
    ) -> Result<order::Model, ServiceError> {
        Ok(order.insert(conn).await?)
    }

    /// Inserts the lines of `order_id`; prices are whatever the caller froze.
    pub async fn insert_items<C: ConnectionTrait>(
        conn: &C,
        order_id: Uuid,
        items: Vec<order_item::ActiveModel>,
    ) -> Result<Vec<order_item::Model>, ServiceError> {
        let mut created = Vec::with_capacity(items.len());
        for mut item in items {
            item.order_id = Set(order_id);
            created.push(item.insert(conn).await?);
        }
        Ok(created)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<order::Model>, ServiceError> {
        Ok(Order::find_by_id(id).one(conn).await?)
    }

    pub async fn find_items<C: ConnectionTrait>(
        conn: &C,
        order_id: Uuid,
    ) -> Result<Vec<order_item::Model>, ServiceError> {
        Ok(OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(conn)
            .await?)
    }

    pub async fn list_by_user<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<order::Model>, u64), ServiceError> {
        let paginator = Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .paginate(conn, per_page);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page_index(page)).await?;
        Ok((orders, total))
    }

    pub async fn list_by_status<C: ConnectionTrait>(
        conn: &C,
        status: Option<OrderStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<order::Model>, u64), ServiceError> {
        let mut query = Order::find();
        if let Some(status) = status {
            query = query.filter(order::Column::OrderStatus.eq(status));
        }
        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(conn, per_page);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page_index(page)).await?;
        Ok((orders, total))
    }

    pub async fn update<C: ConnectionTrait>(
        conn: &C,
        mut order: order::ActiveModel,
    ) -> Result<order::Model, ServiceError> {
        order.updated_at = Set(Utc::now());
        Ok(order.update(conn).await?)
    }

    pub async fn create_cancellation_request<C: ConnectionTrait>(
        conn: &C,
        request: cancellation_request::ActiveModel,
    ) -> Result<cancellation_request::Model, ServiceError> {
        Ok(request.insert(conn).await?)
    }

    /// The request still awaiting an admin decision for this order.
    pub async fn find_pending_cancellation<C: ConnectionTrait>(
        conn: &C,
        order_id: Uuid,
    ) -> Result<Option<cancellation_request::Model>, ServiceError> {
        Ok(CancellationRequest::find()
            .filter(cancellation_request::Column::OrderId.eq(order_id))
            .filter(cancellation_request::Column::Status.eq(CancellationStatus::PendingReview))
            .order_by_desc(cancellation_request::Column::CreatedAt)
            .one(conn)
            .await?)
    }

    pub async fn list_pending_cancellations<C: ConnectionTrait>(
        conn: &C,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<cancellation_request::Model>, u64), ServiceError> {
        let paginator = CancellationRequest::find()
            .filter(cancellation_request::Column::Status.eq(CancellationStatus::PendingReview))
            .order_by_asc(cancellation_request::Column::CreatedAt)
            .paginate(conn, per_page);
        let total = paginator.num_items().await?;
        let requests = paginator.fetch_page(page_index(page)).await?;
        Ok((requests, total))
    }

    pub async fn update_cancellation_request<C: ConnectionTrait>(
        conn: &C,
        request: cancellation_request::ActiveModel,
    ) -> Result<cancellation_request::Model, ServiceError> {
        Ok(request.update(conn).await?)
    }
}
