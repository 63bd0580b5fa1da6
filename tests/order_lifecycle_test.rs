//! Order lifecycle after placement: admin status progression, user
//! cancellation with admin review, and refunds for cancelled paid orders.

mod common;

use assert_matches::assert_matches;
use common::{gateway_signature, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use storefront_api::{
    entities::{
        cancellation_request::CancellationStatus, wallet_transaction::WalletTransactionType,
        CancellationRequest, DeliveryStatus, OrderStatus, Payment, PaymentStatus, RefundStatus,
    },
    errors::{OrderError, ServiceError},
    services::{order_cancellation::CancelOrderInput, payments::GatewayCallbackInput},
};
use uuid::Uuid;

fn reason(text: &str) -> CancelOrderInput {
    CancelOrderInput {
        reason: Some(text.to_string()),
    }
}

#[tokio::test]
async fn unpaid_cod_order_cancels_immediately() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let lamp = app.seed_product("Lamp", dec!(800), 5).await;
    let placed = app.place_cod_order(user, lamp.id, 2).await;
    assert_eq!(app.stock_of(lamp.id).await, 3);

    let outcome = app
        .services
        .cancellations
        .cancel_order(user, placed.order.id, reason("changed my mind"))
        .await
        .unwrap();

    assert!(outcome.request.is_none());
    assert_eq!(outcome.refunded_amount, Decimal::ZERO);
    assert_eq!(outcome.order.order_status, OrderStatus::Cancelled);
    assert_eq!(outcome.order.delivery_status, DeliveryStatus::Cancelled);
    assert!(outcome.order.is_cancelled);
    assert_eq!(app.stock_of(lamp.id).await, 5);

    let payment = Payment::find_by_id(placed.payment.unwrap().id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Cancelled);

    let err = app
        .services
        .cancellations
        .cancel_order(user, placed.order.id, CancelOrderInput::default())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::OrderAlreadyCancelled));
    assert_eq!(app.stock_of(lamp.id).await, 5);
}

#[tokio::test]
async fn only_the_owner_can_cancel() {
    let app = TestApp::new().await;
    let owner = Uuid::new_v4();
    let lamp = app.seed_product("Lamp", dec!(800), 5).await;
    let placed = app.place_cod_order(owner, lamp.id, 1).await;

    let err = app
        .services
        .cancellations
        .cancel_order(Uuid::new_v4(), placed.order.id, CancelOrderInput::default())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::Unauthorized));

    let err = app
        .services
        .cancellations
        .cancel_order(owner, Uuid::new_v4(), CancelOrderInput::default())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::OrderNotFound));
}

#[tokio::test]
async fn confirmed_order_cancellation_goes_through_review() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let chair = app.seed_product("Chair", dec!(3000), 4).await;
    let placed = app.place_cod_order(user, chair.id, 2).await;
    let order_id = placed.order.id;
    app.advance_to(order_id, OrderStatus::Confirmed).await;

    let outcome = app
        .services
        .cancellations
        .cancel_order(user, order_id, reason("found it cheaper"))
        .await
        .unwrap();
    assert_eq!(outcome.order.order_status, OrderStatus::PendingCancellation);
    let request = outcome.request.expect("review request");
    assert_eq!(request.status, CancellationStatus::PendingReview);
    assert_eq!(request.previous_status, OrderStatus::Confirmed);
    assert_eq!(request.reason.as_deref(), Some("found it cheaper"));
    // Stock stays reserved until the admin decides.
    assert_eq!(app.stock_of(chair.id).await, 2);

    let (pending, total) = app
        .services
        .cancellations
        .list_pending_requests(1, 20)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(pending[0].order_id, order_id);

    let approved = app
        .services
        .cancellations
        .approve_cancellation(order_id)
        .await
        .unwrap();
    assert_eq!(approved.order.order_status, OrderStatus::Cancelled);
    assert_eq!(approved.refunded_amount, Decimal::ZERO);
    let closed = approved.request.expect("closed request");
    assert_eq!(closed.status, CancellationStatus::Approved);
    assert!(closed.is_stock_updated);
    assert!(closed.reviewed_at.is_some());
    assert_eq!(app.stock_of(chair.id).await, 4);

    let err = app
        .services
        .cancellations
        .approve_cancellation(order_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::OrderAlreadyCancelled));
    assert_eq!(app.stock_of(chair.id).await, 4);
}

#[tokio::test]
async fn rejected_cancellation_restores_previous_status() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let desk = app.seed_product("Desk", dec!(4000), 3).await;
    let placed = app.place_cod_order(user, desk.id, 1).await;
    let order_id = placed.order.id;
    app.advance_to(order_id, OrderStatus::Processing).await;

    app.services
        .cancellations
        .cancel_order(user, order_id, CancelOrderInput::default())
        .await
        .unwrap();

    let rejected = app
        .services
        .cancellations
        .reject_cancellation(order_id)
        .await
        .unwrap();
    assert_eq!(rejected.order.order_status, OrderStatus::Processing);
    assert_eq!(
        rejected.request.unwrap().status,
        CancellationStatus::Rejected
    );
    assert_eq!(app.stock_of(desk.id).await, 2);

    let err = app
        .services
        .cancellations
        .reject_cancellation(order_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::OrderNotPendingCancellation));

    // The order can still be shipped after a rejected request.
    let shipped = app
        .services
        .orders
        .update_order_status(order_id, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(shipped.delivery_status, DeliveryStatus::Shipped);

    let err = app
        .services
        .cancellations
        .cancel_order(user, order_id, CancelOrderInput::default())
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::Order(OrderError::OrderNotCancellable { status }) if status == "shipped"
    );
}

#[tokio::test]
async fn approving_without_a_request_is_rejected() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let desk = app.seed_product("Desk", dec!(4000), 3).await;
    let placed = app.place_cod_order(user, desk.id, 1).await;

    let err = app
        .services
        .cancellations
        .approve_cancellation(placed.order.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::OrderNotPendingCancellation));
}

#[tokio::test]
async fn admin_cancel_closes_a_pending_request() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let sofa = app.seed_product("Sofa", dec!(9000), 2).await;
    let placed = app.place_cod_order(user, sofa.id, 1).await;
    let order_id = placed.order.id;
    app.advance_to(order_id, OrderStatus::Confirmed).await;
    app.services
        .cancellations
        .cancel_order(user, order_id, CancelOrderInput::default())
        .await
        .unwrap();

    let outcome = app
        .services
        .cancellations
        .admin_cancel_order(order_id)
        .await
        .unwrap();
    assert_eq!(outcome.order.order_status, OrderStatus::Cancelled);
    assert_eq!(outcome.request.unwrap().status, CancellationStatus::Approved);
    assert_eq!(app.stock_of(sofa.id).await, 2);

    let requests = CancellationRequest::find().all(&*app.db).await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests.iter().all(|r| r.status != CancellationStatus::PendingReview));
}

#[tokio::test]
async fn admin_cannot_cancel_a_shipped_order() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let sofa = app.seed_product("Sofa", dec!(9000), 2).await;
    let placed = app.place_cod_order(user, sofa.id, 1).await;
    app.advance_to(placed.order.id, OrderStatus::Shipped).await;

    let err = app
        .services
        .cancellations
        .admin_cancel_order(placed.order.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::OrderNotCancellable { .. }));
    assert_eq!(app.stock_of(sofa.id).await, 1);
}

#[tokio::test]
async fn delivering_a_cod_order_settles_its_payment() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let kettle = app.seed_product("Kettle", dec!(1200), 6).await;
    let placed = app.place_cod_order(user, kettle.id, 1).await;
    let order_id = placed.order.id;

    app.advance_to(order_id, OrderStatus::Delivered).await;

    let details = app.services.orders.get_order(user, order_id).await.unwrap();
    assert_eq!(details.order.order_status, OrderStatus::Delivered);
    assert_eq!(details.order.delivery_status, DeliveryStatus::Delivered);
    assert!(details.order.delivered_at.is_some());
    let payment = details.payment.unwrap();
    assert_eq!(payment.status, PaymentStatus::Paid);
    assert!(payment.paid_at.is_some());

    let err = app
        .services
        .orders
        .update_order_status(order_id, OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::OrderAlreadyDelivered));
}

#[tokio::test]
async fn status_updates_reject_illegal_targets() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let kettle = app.seed_product("Kettle", dec!(1200), 6).await;
    let placed = app.place_cod_order(user, kettle.id, 1).await;

    let err = app
        .services
        .orders
        .update_order_status(placed.order.id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = app
        .services
        .orders
        .update_order_status(placed.order.id, OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::InvalidTransition { .. }));

    let err = app
        .services
        .orders
        .update_order_status(Uuid::new_v4(), OrderStatus::Confirmed)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::OrderNotFound));
}

#[tokio::test]
async fn cancelling_a_paid_gateway_order_refunds_to_wallet() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let phone = app.seed_product("Phone", dec!(15000), 3).await;
    let placed = app.place_gateway_order(user, phone.id, 1).await;
    let gateway_order_id = placed
        .payment
        .as_ref()
        .and_then(|p| p.gateway_order_id.clone())
        .unwrap();

    app.services
        .payments
        .verify_and_update_gateway_payment(
            user,
            GatewayCallbackInput {
                signature: gateway_signature(&gateway_order_id, "pay_001"),
                gateway_order_id,
                gateway_payment_id: "pay_001".to_string(),
            },
        )
        .await
        .unwrap();

    let requested = app
        .services
        .cancellations
        .cancel_order(user, placed.order.id, reason("no longer needed"))
        .await
        .unwrap();
    assert_eq!(requested.order.order_status, OrderStatus::PendingCancellation);

    let outcome = app
        .services
        .cancellations
        .approve_cancellation(placed.order.id)
        .await
        .unwrap();
    assert_eq!(outcome.refunded_amount, dec!(15000));
    assert_eq!(outcome.order.refund_status, Some(RefundStatus::Completed));

    let balance = app.services.wallet.get_balance(user).await.unwrap();
    assert_eq!(balance.balance, dec!(15000));
    let (transactions, _) = app
        .services
        .wallet
        .list_transactions(user, 1, 20)
        .await
        .unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].transaction_type, WalletTransactionType::Refund);
    assert_eq!(transactions[0].reference_id, Some(placed.order.id));

    let payment = Payment::find_by_id(placed.payment.unwrap().id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Refunded);
    assert_eq!(app.stock_of(phone.id).await, 3);
}

#[tokio::test]
async fn order_listings_are_scoped_to_the_owner() {
    let app = TestApp::new().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let pen = app.seed_product("Pen", dec!(50), 100).await;
    let alice_order = app.place_cod_order(alice, pen.id, 1).await;
    app.place_cod_order(bob, pen.id, 3).await;

    let (orders, total) = app.services.orders.list_orders(alice, 1, 20).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(orders[0].id, alice_order.order.id);

    let err = app
        .services
        .orders
        .get_order(bob, alice_order.order.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::Unauthorized));

    let (all, total) = app
        .services
        .orders
        .list_all_orders(Some(OrderStatus::PendingPayment), 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(all.len(), 2);
}
