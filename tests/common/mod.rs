#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use serde_json::Value;
use storefront_api::{
    auth::{USER_ID_HEADER, USER_ROLE_HEADER},
    config::AppConfig,
    db::{self, DbConfig},
    entities::{
        commerce::{checkout_session, user_address},
        product, OrderStatus,
    },
    errors::PaymentError,
    events::{self, EventSender},
    handlers::AppServices,
    repositories::{address_repository::AddressFields, AddressRepository, ProductRepository},
    services::{
        commerce::AddToCartInput,
        orders::OrderDetails,
        payment_gateway::{self, PaymentGateway},
    },
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

pub const GATEWAY_SECRET: &str = "test_gateway_secret";

/// In-process gateway: hands out sequential remote order ids and checks
/// signatures with the real HMAC scheme.
#[derive(Debug, Default)]
pub struct FakeGateway {
    issued: AtomicU64,
}

impl FakeGateway {
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_remote_order(
        &self,
        _amount_minor: i64,
        _currency: &str,
        _receipt: &str,
    ) -> Result<String, PaymentError> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("order_test_{n}"))
    }

    fn verify_signature(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> Result<(), PaymentError> {
        payment_gateway::verify_with_secret(GATEWAY_SECRET, gateway_order_id, gateway_payment_id, signature)
    }
}

/// Signature a genuine gateway callback would carry.
pub fn gateway_signature(gateway_order_id: &str, gateway_payment_id: &str) -> String {
    payment_gateway::sign(GATEWAY_SECRET, gateway_order_id, gateway_payment_id).unwrap()
}

/// Application wiring over a fresh in-memory SQLite database.
pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub config: AppConfig,
    pub services: AppServices,
    pub event_sender: Arc<EventSender>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_gateway(Arc::new(FakeGateway::default())).await
    }

    pub async fn with_gateway(gateway: Arc<dyn PaymentGateway>) -> Self {
        let mut config = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        config.gateway.key_secret = GATEWAY_SECRET.to_string();

        // One connection: every pool checkout must see the same in-memory database.
        let pool = db::establish_connection_with_config(&DbConfig {
            url: config.database_url.clone(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        })
        .await
        .expect("connect to in-memory sqlite");
        db::run_migrations(&pool).await.expect("run migrations");

        let db = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db.clone(), event_sender.clone(), gateway, &config);

        Self {
            db,
            config,
            services,
            event_sender,
            _event_task: event_task,
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            db: self.db.clone(),
            config: self.config.clone(),
            event_sender: self.event_sender.clone(),
            services: self.services.clone(),
        }
    }

    pub fn router(&self) -> Router {
        storefront_api::app_router(self.state())
    }

    pub async fn seed_product(&self, name: &str, price: Decimal, stock: i32) -> product::Model {
        ProductRepository::create(&*self.db, name, price, stock)
            .await
            .expect("seed product")
    }

    pub async fn seed_address(&self, user_id: Uuid) -> user_address::Model {
        AddressRepository::create_user_address(&*self.db, user_id, sample_address("221B Baker Street"))
            .await
            .expect("seed address")
    }

    pub async fn add_to_cart(&self, user_id: Uuid, product_id: Uuid, quantity: i32) {
        self.services
            .cart
            .add_item(user_id, AddToCartInput { product_id, quantity })
            .await
            .expect("add to cart");
    }

    /// Session priced from the current cart with a shipping address attached.
    pub async fn ready_checkout(&self, user_id: Uuid) -> checkout_session::Model {
        let address = self.seed_address(user_id).await;
        let session = self
            .services
            .checkout
            .get_or_create_session(user_id)
            .await
            .expect("create checkout session");
        self.services
            .checkout
            .set_shipping_address(user_id, session.id, address.id)
            .await
            .expect("set shipping address")
    }

    /// Cart with `quantity` of `product_id` placed as a COD order.
    pub async fn place_cod_order(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> OrderDetails {
        self.add_to_cart(user_id, product_id, quantity).await;
        let session = self.ready_checkout(user_id).await;
        self.services
            .orders
            .place_order_cod(user_id, session.id)
            .await
            .expect("place cod order")
    }

    pub async fn place_gateway_order(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> OrderDetails {
        self.add_to_cart(user_id, product_id, quantity).await;
        let session = self.ready_checkout(user_id).await;
        self.services
            .orders
            .place_order_gateway(user_id, session.id)
            .await
            .expect("place gateway order")
    }

    /// Walks an order through the admin statuses up to `target`.
    pub async fn advance_to(&self, order_id: Uuid, target: OrderStatus) {
        let path = [
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ];
        for status in path {
            self.services
                .orders
                .update_order_status(order_id, status)
                .await
                .expect("advance order status");
            if status == target {
                break;
            }
        }
    }

    pub async fn stock_of(&self, product_id: Uuid) -> i32 {
        ProductRepository::find_by_id(&*self.db, product_id)
            .await
            .unwrap()
            .expect("product exists")
            .stock_quantity
    }

    /// Takes a product off sale the way catalogue admin does: the row stays.
    pub async fn soft_delete_product(&self, product_id: Uuid) {
        let product = ProductRepository::find_by_id(&*self.db, product_id)
            .await
            .unwrap()
            .expect("product exists");
        let mut active: product::ActiveModel = product.into();
        active.deleted_at = Set(Some(chrono::Utc::now()));
        active.update(&*self.db).await.expect("soft delete product");
    }

    pub async fn count<E: EntityTrait>(&self) -> u64
    where
        E::Model: Send + Sync,
    {
        E::find().count(&*self.db).await.unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<(Uuid, &str)>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((user_id, role)) = user {
            builder = builder
                .header(USER_ID_HEADER, user_id.to_string())
                .header(USER_ROLE_HEADER, role);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };
        self.router()
            .oneshot(builder.body(body).unwrap())
            .await
            .expect("router error during test request")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub fn sample_address(line1: &str) -> AddressFields {
    AddressFields {
        full_name: "Test Customer".to_string(),
        phone: "9999999999".to_string(),
        line1: line1.to_string(),
        line2: None,
        city: "Pune".to_string(),
        state: "MH".to_string(),
        postal_code: "411001".to_string(),
        country: "IN".to_string(),
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
