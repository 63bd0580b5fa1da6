//! Third-party payment gateway boundary.
//!
//! Order placement asks the gateway for a remote order id; the client pays
//! against it and posts back `(order_id, payment_id, signature)`, where the
//! signature is `hex(HMAC-SHA256(key_secret, "{order_id}|{payment_id}"))`.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use tracing::{error, info, instrument};

use crate::config::GatewayConfig;
use crate::errors::{PaymentError, ServiceError};

type HmacSha256 = Hmac<Sha256>;

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Registers an order of `amount_minor` (paise, cents) with the gateway.
    async fn create_remote_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<String, PaymentError>;

    /// Checks a callback signature. Never has side effects.
    fn verify_signature(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> Result<(), PaymentError>;
}

/// Hex HMAC-SHA256 of `"{order_id}|{payment_id}"` under `secret`.
pub fn sign(secret: &str, gateway_order_id: &str, gateway_payment_id: &str) -> Result<String, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| PaymentError::InvalidSignature)?;
    mac.update(format!("{}|{}", gateway_order_id, gateway_payment_id).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

pub fn verify_with_secret(
    secret: &str,
    gateway_order_id: &str,
    gateway_payment_id: &str,
    signature: &str,
) -> Result<(), PaymentError> {
    if secret.is_empty() {
        return Err(PaymentError::InvalidSignature);
    }
    let expected = sign(secret, gateway_order_id, gateway_payment_id)?;
    if constant_time_eq(&expected, &signature.to_ascii_lowercase()) {
        Ok(())
    } else {
        Err(PaymentError::InvalidSignature)
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    id: String,
}

/// Razorpay-compatible REST client (`POST /v1/orders`, basic auth).
#[derive(Clone)]
pub struct RazorpayGateway {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::InternalError(format!("gateway client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    #[instrument(skip(self))]
    async fn create_remote_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<String, PaymentError> {
        let url = format!("{}/v1/orders", self.base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderRequest {
                amount: amount_minor,
                currency,
                receipt,
            })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "gateway request failed");
                PaymentError::GatewayOrderCreation(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "gateway rejected order creation");
            return Err(PaymentError::GatewayOrderCreation(format!(
                "gateway responded with {}",
                status
            )));
        }

        let created: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::GatewayOrderCreation(e.to_string()))?;
        info!(gateway_order_id = %created.id, "gateway order created");
        Ok(created.id)
    }

    fn verify_signature(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> Result<(), PaymentError> {
        verify_with_secret(&self.key_secret, gateway_order_id, gateway_payment_id, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::matchers::{basic_auth, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> GatewayConfig {
        GatewayConfig {
            base_url: base_url.to_string(),
            key_id: "rzp_test_key".into(),
            key_secret: "s3cret".into(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn signature_round_trips() {
        let sig = sign("s3cret", "order_1", "pay_1").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(verify_with_secret("s3cret", "order_1", "pay_1", &sig).is_ok());
        assert!(verify_with_secret("s3cret", "order_1", "pay_1", &sig.to_uppercase()).is_ok());
    }

    #[test]
    fn signature_binds_both_ids_and_secret() {
        let sig = sign("s3cret", "order_1", "pay_1").unwrap();
        assert_matches!(
            verify_with_secret("s3cret", "order_1", "pay_2", &sig),
            Err(PaymentError::InvalidSignature)
        );
        assert_matches!(
            verify_with_secret("other", "order_1", "pay_1", &sig),
            Err(PaymentError::InvalidSignature)
        );
        assert_matches!(
            verify_with_secret("s3cret", "order_1", "pay_1", "deadbeef"),
            Err(PaymentError::InvalidSignature)
        );
    }

    #[test]
    fn empty_secret_never_verifies() {
        let sig = sign("", "order_1", "pay_1").unwrap();
        assert_matches!(
            verify_with_secret("", "order_1", "pay_1", &sig),
            Err(PaymentError::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn creates_remote_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .and(basic_auth("rzp_test_key", "s3cret"))
            .and(body_json(serde_json::json!({
                "amount": 25000,
                "currency": "INR",
                "receipt": "rcpt-1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "order_ABC123",
                "amount": 25000,
                "status": "created"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = RazorpayGateway::new(&config(&server.uri())).unwrap();
        let id = gateway
            .create_remote_order(25000, "INR", "rcpt-1")
            .await
            .unwrap();
        assert_eq!(id, "order_ABC123");
    }

    #[tokio::test]
    async fn gateway_error_status_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let gateway = RazorpayGateway::new(&config(&server.uri())).unwrap();
        let err = gateway
            .create_remote_order(100, "INR", "rcpt-2")
            .await
            .unwrap_err();
        assert_matches!(err, PaymentError::GatewayOrderCreation(msg) if msg.contains("400"));
    }
}
