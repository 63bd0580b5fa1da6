//! Returns: the delivery window, admin decisions, wallet refunds and
//! restocking once the parcel is back.

mod common;

use assert_matches::assert_matches;
use chrono::Duration;
use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use storefront_api::{
    entities::{
        wallet_transaction::WalletTransactionType, OrderStatus, Payment, PaymentStatus,
        RefundStatus,
    },
    errors::{OrderError, ReturnError, ServiceError},
    services::returns::InitiateReturnInput,
};
use uuid::Uuid;

fn return_of(order_id: Uuid, reason: &str) -> InitiateReturnInput {
    InitiateReturnInput {
        order_id,
        reason: reason.to_string(),
    }
}

/// A delivered COD order for a fresh user, with its product.
async fn delivered_order(app: &TestApp, qty: i32) -> (Uuid, Uuid, Uuid) {
    let user = Uuid::new_v4();
    let shoes = app.seed_product("Shoes", dec!(2000), 10).await;
    let placed = app.place_cod_order(user, shoes.id, qty).await;
    app.advance_to(placed.order.id, OrderStatus::Delivered).await;
    (user, placed.order.id, shoes.id)
}

#[tokio::test]
async fn return_window_closes_exactly_at_the_deadline() {
    let app = TestApp::new().await;
    let (user, order_id, _) = delivered_order(&app, 1).await;
    let delivered_at = app
        .services
        .orders
        .get_order(user, order_id)
        .await
        .unwrap()
        .order
        .delivered_at
        .unwrap();

    let err = app
        .services
        .returns
        .initiate_return_at(user, return_of(order_id, "too small"), delivered_at + Duration::days(14))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Return(ReturnError::ReturnWindowExpired));

    let request = app
        .services
        .returns
        .initiate_return_at(
            user,
            return_of(order_id, "too small"),
            delivered_at + Duration::days(14) - Duration::seconds(1),
        )
        .await
        .unwrap();
    assert_eq!(request.reason, "too small");
    assert!(!request.is_processed());

    let order = app.services.orders.get_order(user, order_id).await.unwrap().order;
    assert_eq!(order.order_status, OrderStatus::ReturnRequested);
    assert!(order.has_return_request);
}

#[tokio::test]
async fn one_return_per_order() {
    let app = TestApp::new().await;
    let (user, order_id, _) = delivered_order(&app, 1).await;

    app.services
        .returns
        .initiate_return(user, return_of(order_id, "wrong colour"))
        .await
        .unwrap();

    let err = app
        .services
        .returns
        .initiate_return(user, return_of(order_id, "still wrong"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Return(ReturnError::ReturnAlreadyRequested));
}

#[tokio::test]
async fn return_preconditions() {
    let app = TestApp::new().await;
    let (user, order_id, _) = delivered_order(&app, 1).await;

    let err = app
        .services
        .returns
        .initiate_return(user, return_of(order_id, "   "))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Return(ReturnError::InvalidReturnReason));

    let err = app
        .services
        .returns
        .initiate_return(Uuid::new_v4(), return_of(order_id, "not mine"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::Unauthorized));

    let other = Uuid::new_v4();
    let hat = app.seed_product("Hat", dec!(300), 5).await;
    let undelivered = app.place_cod_order(other, hat.id, 1).await;
    app.advance_to(undelivered.order.id, OrderStatus::Shipped).await;
    let err = app
        .services
        .returns
        .initiate_return(other, return_of(undelivered.order.id, "late"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Return(ReturnError::OrderNotDelivered));

    let cancelled = app.place_cod_order(other, hat.id, 1).await;
    app.services
        .cancellations
        .cancel_order(other, cancelled.order.id, Default::default())
        .await
        .unwrap();
    let err = app
        .services
        .returns
        .initiate_return(other, return_of(cancelled.order.id, "never came"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Return(ReturnError::OrderCancelled));
}

#[tokio::test]
async fn approved_return_refunds_to_wallet_once() {
    let app = TestApp::new().await;
    let (user, order_id, _) = delivered_order(&app, 2).await;
    let request = app
        .services
        .returns
        .initiate_return(user, return_of(order_id, "defective"))
        .await
        .unwrap();

    let err = app
        .services
        .returns
        .initiate_refund(request.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Return(ReturnError::ReturnNotApproved));

    let approved = app
        .services
        .returns
        .update_return_request(request.id, true)
        .await
        .unwrap();
    assert!(approved.is_approved());

    let err = app
        .services
        .returns
        .update_return_request(request.id, false)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Return(ReturnError::ReturnRequestAlreadyProcessed));

    let outcome = app.services.returns.initiate_refund(request.id).await.unwrap();
    assert_eq!(outcome.wallet_balance, dec!(4000));
    assert_eq!(outcome.order.order_status, OrderStatus::Refunded);
    assert_eq!(outcome.order.refund_status, Some(RefundStatus::Completed));
    assert!(outcome.return_request.refund_initiated);
    assert!(outcome.return_request.refund_completed);
    assert_eq!(outcome.return_request.refund_amount, Some(dec!(4000)));

    let (transactions, _) = app
        .services
        .wallet
        .list_transactions(user, 1, 20)
        .await
        .unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].transaction_type, WalletTransactionType::Refund);
    assert_eq!(transactions[0].reference_id, Some(request.id));
    assert_eq!(transactions[0].reference_type.as_deref(), Some("return_request"));

    let payments = Payment::find().all(&*app.db).await.unwrap();
    assert_eq!(payments[0].status, PaymentStatus::Refunded);

    let err = app
        .services
        .returns
        .initiate_refund(request.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Return(ReturnError::RefundAlreadyInitiated));
    let balance = app.services.wallet.get_balance(user).await.unwrap();
    assert_eq!(balance.balance, dec!(4000));
}

#[tokio::test]
async fn rejected_return_puts_the_order_back_to_delivered() {
    let app = TestApp::new().await;
    let (user, order_id, _) = delivered_order(&app, 1).await;
    let request = app
        .services
        .returns
        .initiate_return(user, return_of(order_id, "meh"))
        .await
        .unwrap();

    let rejected = app
        .services
        .returns
        .update_return_request(request.id, false)
        .await
        .unwrap();
    assert!(rejected.rejected_at.is_some());
    assert!(!rejected.is_approved());

    let order = app.services.orders.get_order(user, order_id).await.unwrap().order;
    assert_eq!(order.order_status, OrderStatus::Delivered);

    let err = app
        .services
        .returns
        .initiate_refund(request.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Return(ReturnError::ReturnNotApproved));
}

#[tokio::test]
async fn received_return_restocks_once() {
    let app = TestApp::new().await;
    let (user, order_id, product_id) = delivered_order(&app, 3).await;
    assert_eq!(app.stock_of(product_id).await, 7);
    let request = app
        .services
        .returns
        .initiate_return(user, return_of(order_id, "bulk mistake"))
        .await
        .unwrap();

    let err = app
        .services
        .returns
        .mark_returned_to_seller(request.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Return(ReturnError::ReturnNotApproved));

    app.services
        .returns
        .update_return_request(request.id, true)
        .await
        .unwrap();
    let received = app
        .services
        .returns
        .mark_returned_to_seller(request.id)
        .await
        .unwrap();
    assert!(received.is_order_reached_seller);
    assert!(received.is_stock_updated);
    assert!(received.returned_to_seller_at.is_some());
    assert_eq!(app.stock_of(product_id).await, 10);

    let err = app
        .services
        .returns
        .mark_returned_to_seller(request.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Return(ReturnError::AlreadyMarkedAsReturned));
    assert_eq!(app.stock_of(product_id).await, 10);
}

#[tokio::test]
async fn returns_are_visible_to_owner_and_admin_only() {
    let app = TestApp::new().await;
    let (user, order_id, _) = delivered_order(&app, 1).await;
    let request = app
        .services
        .returns
        .initiate_return(user, return_of(order_id, "gift duplicate"))
        .await
        .unwrap();
    let stranger = Uuid::new_v4();

    assert!(app.services.returns.get_return(user, false, request.id).await.is_ok());
    assert!(app.services.returns.get_return(stranger, true, request.id).await.is_ok());
    let err = app
        .services
        .returns
        .get_return(stranger, false, request.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::Unauthorized));

    let (mine, total) = app.services.returns.list_returns(Some(user), 1, 20).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(mine[0].id, request.id);
    let (theirs, total) = app
        .services
        .returns
        .list_returns(Some(stranger), 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 0);
    assert!(theirs.is_empty());

    let err = app
        .services
        .returns
        .get_return(user, false, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Return(ReturnError::ReturnRequestNotFound));
}
