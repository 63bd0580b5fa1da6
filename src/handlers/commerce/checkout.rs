use axum::{
    extract::{Json, Path, State},
    routing::{get, post, put},
    Router,
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    entities::commerce::checkout_session,
    handlers::common::{success_response, validate_input, ApiResult},
    services::commerce::{
        ApplyCouponInput, CheckoutSummary, CouponApplication, SetShippingAddressInput,
    },
    AppState,
};

/// Creates the router for checkout endpoints
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(start_checkout))
        .route("/summary", get(get_summary))
        .route("/:session_id/shipping-address", put(set_shipping_address))
        .route("/:session_id/coupon", post(apply_coupon).delete(remove_coupon))
}

/// Get or create the caller's pending checkout session, refreshed from the cart
async fn start_checkout(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<checkout_session::Model> {
    let session = state
        .services
        .checkout
        .get_or_create_session(user.user_id)
        .await?;
    Ok(success_response(session))
}

/// Checkout summary with stock re-validated
async fn get_summary(State(state): State<AppState>, user: AuthUser) -> ApiResult<CheckoutSummary> {
    let summary = state.services.checkout.get_summary(user.user_id).await?;
    Ok(success_response(summary))
}

async fn set_shipping_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SetShippingAddressInput>,
) -> ApiResult<checkout_session::Model> {
    let session = state
        .services
        .checkout
        .set_shipping_address(user.user_id, session_id, payload.address_id)
        .await?;
    Ok(success_response(session))
}

/// Apply a coupon code; a capped discount comes back with a message
async fn apply_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<ApplyCouponInput>,
) -> ApiResult<CouponApplication> {
    validate_input(&payload)?;
    let applied = state
        .services
        .checkout
        .apply_coupon(user.user_id, session_id, payload)
        .await?;
    Ok(success_response(applied))
}

async fn remove_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Path(session_id): Path<Uuid>,
) -> ApiResult<checkout_session::Model> {
    let session = state
        .services
        .checkout
        .remove_coupon(user.user_id, session_id)
        .await?;
    Ok(success_response(session))
}
