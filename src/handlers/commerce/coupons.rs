use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::{
    auth::AdminUser,
    entities::commerce::coupon,
    handlers::common::{
        created_response, success_response, validate_input, ApiResult, CreatedResult,
        PaginatedResponse, PaginationParams,
    },
    services::commerce::{CreateCouponInput, UpdateCouponInput},
    AppState,
};

/// Back-office coupon administration
pub fn coupons_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_coupon).get(list_coupons))
        .route("/:id", get(get_coupon).put(update_coupon))
        .route("/:id/deactivate", post(deactivate_coupon))
}

async fn create_coupon(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateCouponInput>,
) -> CreatedResult<coupon::Model> {
    validate_input(&payload)?;
    let coupon = state.services.coupons.create_coupon(payload).await?;
    tracing::info!(admin_id = %admin.user_id, coupon_id = %coupon.id, "Coupon created");
    Ok(created_response(coupon))
}

async fn list_coupons(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<coupon::Model>> {
    let (page, per_page) = params.normalized();
    let (coupons, total) = state.services.coupons.list_coupons(page, per_page).await?;
    Ok(success_response(PaginatedResponse::new(coupons, page, per_page, total)))
}

async fn get_coupon(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<coupon::Model> {
    Ok(success_response(state.services.coupons.get_coupon(id).await?))
}

async fn update_coupon(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCouponInput>,
) -> ApiResult<coupon::Model> {
    validate_input(&payload)?;
    Ok(success_response(
        state.services.coupons.update_coupon(id, payload).await?,
    ))
}

async fn deactivate_coupon(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<coupon::Model> {
    Ok(success_response(
        state.services.coupons.deactivate_coupon(id).await?,
    ))
}
