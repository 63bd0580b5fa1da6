use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};

use crate::{
    auth::AuthUser,
    handlers::common::{success_response, validate_input, ApiResult},
    services::payments::{CapturedPayment, GatewayCallbackInput},
    AppState,
};

pub fn payments_routes() -> Router<AppState> {
    Router::new().route("/verify", post(verify_gateway_payment))
}

/// Gateway checkout callback: verifies the signature and captures the payment.
///
/// A bad signature is rejected without touching the order or payment.
pub async fn verify_gateway_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<GatewayCallbackInput>,
) -> ApiResult<CapturedPayment> {
    validate_input(&payload)?;
    let captured = state
        .services
        .payments
        .verify_and_update_gateway_payment(user.user_id, payload)
        .await?;
    Ok(success_response(captured))
}
