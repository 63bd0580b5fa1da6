//! Gateway placement and callback verification.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use common::{gateway_signature, TestApp};
use mockall::mock;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use storefront_api::{
    entities::{
        commerce::{CheckoutSession, CheckoutStatus},
        OrderItem, Order, OrderStatus, Payment, PaymentMethod, PaymentStatus,
    },
    errors::{OrderError, PaymentError, ServiceError},
    services::{payment_gateway::PaymentGateway, payments::GatewayCallbackInput},
};
use uuid::Uuid;

mock! {
    pub Gateway {}

    #[async_trait]
    impl PaymentGateway for Gateway {
        async fn create_remote_order(
            &self,
            amount_minor: i64,
            currency: &str,
            receipt: &str,
        ) -> Result<String, PaymentError>;

        fn verify_signature(
            &self,
            gateway_order_id: &str,
            gateway_payment_id: &str,
            signature: &str,
        ) -> Result<(), PaymentError>;
    }
}

fn callback(gateway_order_id: &str, payment_id: &str, signature: String) -> GatewayCallbackInput {
    GatewayCallbackInput {
        gateway_order_id: gateway_order_id.to_string(),
        gateway_payment_id: payment_id.to_string(),
        signature,
    }
}

#[tokio::test]
async fn gateway_placement_awaits_payment() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let watch = app.seed_product("Watch", dec!(2500), 4).await;

    let placed = app.place_gateway_order(user, watch.id, 2).await;

    assert_eq!(placed.order.order_status, OrderStatus::PendingPayment);
    assert_eq!(placed.order.payment_method, PaymentMethod::Gateway);
    let payment = placed.payment.unwrap();
    assert_eq!(payment.status, PaymentStatus::AwaitingPayment);
    assert_eq!(payment.amount, dec!(5000));
    assert_eq!(payment.gateway_order_id.as_deref(), Some("order_test_1"));
    assert_eq!(app.stock_of(watch.id).await, 2);
}

#[tokio::test]
async fn gateway_orders_are_not_subject_to_the_cod_limit() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let tv = app.seed_product("Television", dec!(60000), 2).await;

    let placed = app.place_gateway_order(user, tv.id, 1).await;
    assert_eq!(placed.order.final_amount, dec!(60000));
}

#[tokio::test]
async fn bad_signature_changes_nothing() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let watch = app.seed_product("Watch", dec!(2500), 4).await;
    let placed = app.place_gateway_order(user, watch.id, 1).await;
    let remote = placed.payment.as_ref().unwrap().gateway_order_id.clone().unwrap();

    let forged = gateway_signature(&remote, "pay_other");
    let err = app
        .services
        .payments
        .verify_and_update_gateway_payment(user, callback(&remote, "pay_123", forged))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Payment(PaymentError::InvalidSignature));

    let details = app.services.orders.get_order(user, placed.order.id).await.unwrap();
    assert_eq!(details.order.order_status, OrderStatus::PendingPayment);
    let payment = details.payment.unwrap();
    assert_eq!(payment.status, PaymentStatus::AwaitingPayment);
    assert!(payment.gateway_payment_id.is_none());
}

#[tokio::test]
async fn genuine_callback_captures_once() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let watch = app.seed_product("Watch", dec!(2500), 4).await;
    let placed = app.place_gateway_order(user, watch.id, 1).await;
    let remote = placed.payment.as_ref().unwrap().gateway_order_id.clone().unwrap();

    // Signatures compare case-insensitively.
    let signature = gateway_signature(&remote, "pay_123").to_uppercase();
    let captured = app
        .services
        .payments
        .verify_and_update_gateway_payment(user, callback(&remote, "pay_123", signature))
        .await
        .unwrap();

    assert_eq!(captured.payment.status, PaymentStatus::Paid);
    assert_eq!(captured.payment.gateway_payment_id.as_deref(), Some("pay_123"));
    assert!(captured.payment.paid_at.is_some());
    assert_eq!(captured.order.order_status, OrderStatus::Confirmed);

    let replay = gateway_signature(&remote, "pay_123");
    let err = app
        .services
        .payments
        .verify_and_update_gateway_payment(user, callback(&remote, "pay_123", replay))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Payment(PaymentError::PaymentAlreadyCaptured));
}

#[tokio::test]
async fn callbacks_are_bound_to_the_payer() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let watch = app.seed_product("Watch", dec!(2500), 4).await;
    let placed = app.place_gateway_order(user, watch.id, 1).await;
    let remote = placed.payment.as_ref().unwrap().gateway_order_id.clone().unwrap();

    let err = app
        .services
        .payments
        .verify_and_update_gateway_payment(
            Uuid::new_v4(),
            callback(&remote, "pay_1", gateway_signature(&remote, "pay_1")),
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::Unauthorized));

    let err = app
        .services
        .payments
        .verify_and_update_gateway_payment(
            user,
            callback("order_unknown", "pay_1", gateway_signature("order_unknown", "pay_1")),
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Payment(PaymentError::PaymentNotFound));
}

#[tokio::test]
async fn callback_after_cancellation_is_refused() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let watch = app.seed_product("Watch", dec!(2500), 4).await;
    let placed = app.place_gateway_order(user, watch.id, 1).await;
    let remote = placed.payment.as_ref().unwrap().gateway_order_id.clone().unwrap();

    app.services
        .cancellations
        .cancel_order(user, placed.order.id, Default::default())
        .await
        .unwrap();

    let err = app
        .services
        .payments
        .verify_and_update_gateway_payment(
            user,
            callback(&remote, "pay_late", gateway_signature(&remote, "pay_late")),
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Order(OrderError::OrderAlreadyCancelled));
}

#[tokio::test]
async fn gateway_failure_rolls_back_placement() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_remote_order()
        .times(1)
        .returning(|_, _, _| Err(PaymentError::GatewayOrderCreation("gateway down".to_string())));
    gateway.expect_verify_signature().never();

    let app = TestApp::with_gateway(Arc::new(gateway)).await;
    let user = Uuid::new_v4();
    let watch = app.seed_product("Watch", dec!(2500), 4).await;
    app.add_to_cart(user, watch.id, 2).await;
    let session = app.ready_checkout(user).await;

    let err = app
        .services
        .orders
        .place_order_gateway(user, session.id)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::Payment(PaymentError::GatewayOrderCreation(msg)) if msg == "gateway down"
    );

    assert_eq!(app.count::<Order>().await, 0);
    assert_eq!(app.count::<OrderItem>().await, 0);
    assert_eq!(app.count::<Payment>().await, 0);
    assert_eq!(app.stock_of(watch.id).await, 4);

    let session = CheckoutSession::find_by_id(session.id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, CheckoutStatus::Pending);
}

#[tokio::test]
async fn gateway_receives_amount_in_minor_units() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_remote_order()
        .withf(|amount, currency, _| *amount == 150_000 && currency == "INR")
        .times(1)
        .returning(|_, _, _| Ok("order_remote_42".to_string()));

    let app = TestApp::with_gateway(Arc::new(gateway)).await;
    let user = Uuid::new_v4();
    let bag = app.seed_product("Bag", dec!(750), 5).await;

    let placed = app.place_gateway_order(user, bag.id, 2).await;
    assert_eq!(
        placed.payment.unwrap().gateway_order_id.as_deref(),
        Some("order_remote_42")
    );
}
