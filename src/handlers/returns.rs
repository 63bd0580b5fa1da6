use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post, put},
    Router,
};
use uuid::Uuid;

use crate::{
    auth::{AdminUser, AuthUser},
    entities::return_request,
    handlers::common::{
        created_response, success_response, validate_input, ApiResult, CreatedResult,
        PaginatedResponse, PaginationParams,
    },
    services::returns::{InitiateReturnInput, RefundOutcome, ReturnDecisionInput},
    AppState,
};

/// Customer return routes
pub fn returns_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(initiate_return).get(list_my_returns))
        .route("/:id", get(get_return))
}

/// Back-office return routes
pub fn returns_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_returns))
        .route("/:id", get(get_return_admin).put(decide_return))
        .route("/:id/refund", post(initiate_refund))
        .route("/:id/received", post(mark_returned_to_seller))
}

/// Open a return for a delivered order inside the return window
pub async fn initiate_return(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<InitiateReturnInput>,
) -> CreatedResult<return_request::Model> {
    validate_input(&payload)?;
    let request = state
        .services
        .returns
        .initiate_return(user.user_id, payload)
        .await?;
    Ok(created_response(request))
}

pub async fn list_my_returns(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<return_request::Model>> {
    let (page, per_page) = params.normalized();
    let (returns, total) = state
        .services
        .returns
        .list_returns(Some(user.user_id), page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::new(returns, page, per_page, total)))
}

pub async fn get_return(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<return_request::Model> {
    let request = state
        .services
        .returns
        .get_return(user.user_id, user.is_admin(), id)
        .await?;
    Ok(success_response(request))
}

pub async fn list_all_returns(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<return_request::Model>> {
    let (page, per_page) = params.normalized();
    let (returns, total) = state
        .services
        .returns
        .list_returns(None, page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::new(returns, page, per_page, total)))
}

pub async fn get_return_admin(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<return_request::Model> {
    let request = state
        .services
        .returns
        .get_return(admin.user_id, true, id)
        .await?;
    Ok(success_response(request))
}

/// Approve or reject a pending return; each request is decided once
pub async fn decide_return(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReturnDecisionInput>,
) -> ApiResult<return_request::Model> {
    let request = state
        .services
        .returns
        .update_return_request(id, payload.approve)
        .await?;
    Ok(success_response(request))
}

/// Refund an approved return to the customer's wallet
pub async fn initiate_refund(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<RefundOutcome> {
    Ok(success_response(
        state.services.returns.initiate_refund(id).await?,
    ))
}

pub async fn mark_returned_to_seller(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<return_request::Model> {
    Ok(success_response(
        state.services.returns.mark_returned_to_seller(id).await?,
    ))
}
