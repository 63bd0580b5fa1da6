use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{AdminUser, AuthUser},
    entities::{cancellation_request, order, OrderStatus},
    handlers::common::{
        created_response, success_response, validate_input, ApiResult, CreatedResult,
        PaginatedResponse, PaginationParams,
    },
    services::{
        order_cancellation::{CancelOrderInput, CancellationOutcome},
        orders::{OrderDetails, PlaceOrderInput, UpdateOrderStatusRequest},
    },
    AppState,
};

/// Customer order routes
pub fn orders_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/cod", post(place_order_cod))
        .route("/gateway", post(place_order_gateway))
        .route("/:id", get(get_order))
        .route("/:id/cancel", post(cancel_order))
}

/// Back-office order routes
pub fn orders_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_orders))
        .route("/cancellation-requests", get(list_cancellation_requests))
        .route("/:id", get(get_order_admin))
        .route("/:id/status", put(update_order_status))
        .route("/:id/cancel", post(admin_cancel_order))
        .route("/:id/cancellation/approve", post(approve_cancellation))
        .route("/:id/cancellation/reject", post(reject_cancellation))
}

/// Query for the admin order list
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl ListOrdersQuery {
    fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Place a cash-on-delivery order from a checkout session
pub async fn place_order_cod(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PlaceOrderInput>,
) -> CreatedResult<OrderDetails> {
    validate_input(&payload)?;
    let details = state
        .services
        .orders
        .place_order_cod(user.user_id, payload.checkout_session_id)
        .await?;
    Ok(created_response(details))
}

/// Place a gateway order; the response carries the remote order id to pay against
pub async fn place_order_gateway(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PlaceOrderInput>,
) -> CreatedResult<OrderDetails> {
    validate_input(&payload)?;
    let details = state
        .services
        .orders
        .place_order_gateway(user.user_id, payload.checkout_session_id)
        .await?;
    Ok(created_response(details))
}

pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<order::Model>> {
    let (page, per_page) = params.normalized();
    let (orders, total) = state
        .services
        .orders
        .list_orders(user.user_id, page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::new(orders, page, per_page, total)))
}

pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderDetails> {
    let details = state.services.orders.get_order(user.user_id, id).await?;
    Ok(success_response(details))
}

/// Request cancellation; unpaid orders cancel at once, others wait for review
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<CancelOrderInput>>,
) -> ApiResult<CancellationOutcome> {
    let input = payload.map(|Json(input)| input).unwrap_or_default();
    validate_input(&input)?;
    let outcome = state
        .services
        .cancellations
        .cancel_order(user.user_id, id, input)
        .await?;
    Ok(success_response(outcome))
}

pub async fn list_all_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListOrdersQuery>,
) -> ApiResult<PaginatedResponse<order::Model>> {
    let (page, per_page) = query.pagination().normalized();
    let (orders, total) = state
        .services
        .orders
        .list_all_orders(query.status, page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::new(orders, page, per_page, total)))
}

pub async fn get_order_admin(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderDetails> {
    Ok(success_response(
        state.services.orders.get_order_details(id).await?,
    ))
}

/// Advance fulfilment: confirmed, processing, shipped or delivered
pub async fn update_order_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> ApiResult<order::Model> {
    validate_input(&request)?;
    let order = state
        .services
        .orders
        .update_order_status(id, request.status)
        .await?;
    tracing::info!(admin_id = %admin.user_id, order_id = %id, status = %order.order_status, "Order status updated by admin");
    Ok(success_response(order))
}

pub async fn admin_cancel_order(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<CancellationOutcome> {
    let outcome = state.services.cancellations.admin_cancel_order(id).await?;
    tracing::info!(admin_id = %admin.user_id, order_id = %id, "Order cancelled by admin");
    Ok(success_response(outcome))
}

pub async fn list_cancellation_requests(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<cancellation_request::Model>> {
    let (page, per_page) = params.normalized();
    let (requests, total) = state
        .services
        .cancellations
        .list_pending_requests(page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::new(requests, page, per_page, total)))
}

pub async fn approve_cancellation(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<CancellationOutcome> {
    Ok(success_response(
        state.services.cancellations.approve_cancellation(id).await?,
    ))
}

pub async fn reject_cancellation(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<CancellationOutcome> {
    Ok(success_response(
        state.services.cancellations.reject_cancellation(id).await?,
    ))
}
