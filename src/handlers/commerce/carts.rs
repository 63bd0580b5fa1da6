use axum::{
    extract::{Json, Path, State},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    entities::commerce::cart_item,
    handlers::common::{created_response, success_response, validate_input, ApiResult, CreatedResult},
    services::commerce::{AddToCartInput, CartView, UpdateCartItemInput},
    AppState,
};

/// Creates the router for the caller's cart
pub fn carts_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_to_cart))
        .route("/items/:item_id", put(update_cart_item).delete(remove_cart_item))
}

/// Get the caller's cart with live prices
async fn get_cart(State(state): State<AppState>, user: AuthUser) -> ApiResult<CartView> {
    let cart = state.services.cart.get_cart(user.user_id).await?;
    Ok(success_response(cart))
}

/// Add a product to the cart, merging with an existing line
async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartInput>,
) -> CreatedResult<cart_item::Model> {
    validate_input(&payload)?;
    let item = state.services.cart.add_item(user.user_id, payload).await?;
    Ok(created_response(item))
}

/// Replace the quantity of a cart line
async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemInput>,
) -> ApiResult<cart_item::Model> {
    validate_input(&payload)?;
    let item = state
        .services
        .cart
        .update_item(user.user_id, item_id, payload)
        .await?;
    Ok(success_response(item))
}

/// Remove a cart line
async fn remove_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<Uuid>,
) -> ApiResult<Value> {
    state.services.cart.remove_item(user.user_id, item_id).await?;
    Ok(success_response(json!({ "removed": item_id })))
}

/// Clear all items from the cart
async fn clear_cart(State(state): State<AppState>, user: AuthUser) -> ApiResult<Value> {
    let removed = state.services.cart.clear_cart(user.user_id).await?;
    Ok(success_response(json!({ "removed_items": removed })))
}
