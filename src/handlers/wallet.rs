use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::{
    auth::{AdminUser, AuthUser},
    entities::wallet_transaction,
    handlers::common::{
        success_response, validate_input, ApiResult, PaginatedResponse, PaginationParams,
    },
    services::wallet::{WalletAdjustmentInput, WalletBalance, WalletEntry},
    AppState,
};

pub fn wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_balance))
        .route("/transactions", get(list_transactions))
}

/// Manual wallet adjustments, keyed by the wallet owner's user id
pub fn wallet_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/:user_id/credit", post(credit_wallet))
        .route("/:user_id/debit", post(debit_wallet))
}

pub async fn get_balance(State(state): State<AppState>, user: AuthUser) -> ApiResult<WalletBalance> {
    Ok(success_response(
        state.services.wallet.get_balance(user.user_id).await?,
    ))
}

/// Ledger rows, oldest first, each with the balance after it
pub async fn list_transactions(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<wallet_transaction::Model>> {
    let (page, per_page) = params.normalized();
    let (rows, total) = state
        .services
        .wallet
        .list_transactions(user.user_id, page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::new(rows, page, per_page, total)))
}

pub async fn credit_wallet(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<WalletAdjustmentInput>,
) -> ApiResult<WalletEntry> {
    validate_input(&payload)?;
    let entry = state.services.wallet.credit(user_id, payload).await?;
    tracing::info!(admin_id = %admin.user_id, %user_id, "Wallet credited by admin");
    Ok(success_response(entry))
}

pub async fn debit_wallet(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<WalletAdjustmentInput>,
) -> ApiResult<WalletEntry> {
    validate_input(&payload)?;
    let entry = state.services.wallet.debit(user_id, payload).await?;
    tracing::info!(admin_id = %admin.user_id, %user_id, "Wallet debited by admin");
    Ok(success_response(entry))
}
