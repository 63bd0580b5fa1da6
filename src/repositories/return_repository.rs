use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::return_request::{self, Entity as ReturnRequest};
use crate::errors::ServiceError;

use super::page_index;

pub struct ReturnRepository;

impl ReturnRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<return_request::Model>, ServiceError> {
        Ok(ReturnRequest::find_by_id(id).one(conn).await?)
    }

    pub async fn find_by_order<C: ConnectionTrait>(
        conn: &C,
        order_id: Uuid,
    ) -> Result<Option<return_request::Model>, ServiceError> {
        Ok(ReturnRequest::find()
            .filter(return_request::Column::OrderId.eq(order_id))
            .one(conn)
            .await?)
    }

    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        request: return_request::ActiveModel,
    ) -> Result<return_request::Model, ServiceError> {
        Ok(request.insert(conn).await?)
    }

    pub async fn update<C: ConnectionTrait>(
        conn: &C,
        mut request: return_request::ActiveModel,
    ) -> Result<return_request::Model, ServiceError> {
        request.updated_at = Set(Utc::now());
        Ok(request.update(conn).await?)
    }

    /// Returns for one user, or every return when `user_id` is `None`.
    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        user_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<return_request::Model>, u64), ServiceError> {
        let mut query = ReturnRequest::find();
        if let Some(user_id) = user_id {
            query = query.filter(return_request::Column::UserId.eq(user_id));
        }
        let paginator = query
            .order_by_desc(return_request::Column::RequestedDate)
            .paginate(conn, per_page);
        let total = paginator.num_items().await?;
        let returns = paginator.fetch_page(page_index(page)).await?;
        Ok((returns, total))
    }
}
