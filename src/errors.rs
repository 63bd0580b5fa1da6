use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub mod domain;

pub use domain::{
    CartError, CheckoutError, CouponError, DomainError, ErrorKind, InventoryError, OrderError,
    PaymentError, ReturnError, WalletError,
};

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Conflict")
    pub error: String,
    /// Stable machine-readable code
    pub code: String,
    /// Human-readable error description
    pub message: String,
    /// ISO 8601 timestamp when error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        sea_orm::error::DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Return(#[from] ReturnError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    fn domain(&self) -> Option<&dyn DomainError> {
        match self {
            Self::Coupon(e) => Some(e),
            Self::Checkout(e) => Some(e),
            Self::Order(e) => Some(e),
            Self::Inventory(e) => Some(e),
            Self::Payment(e) => Some(e),
            Self::Return(e) => Some(e),
            Self::Wallet(e) => Some(e),
            Self::Cart(e) => Some(e),
            _ => None,
        }
    }

    /// Stable error code exposed to clients.
    pub fn code(&self) -> &'static str {
        if let Some(domain) = self.domain() {
            return domain.code();
        }
        match self {
            Self::DatabaseError(_) => "database_error",
            Self::NotFound(_) => "not_found",
            Self::ValidationError(_) => "validation_error",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::ExternalServiceError(_) => "external_service_error",
            _ => "internal_error",
        }
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // A forged callback is the caller's fault, not the gateway's
            Self::Payment(PaymentError::InvalidSignature) => StatusCode::BAD_REQUEST,
            Self::Coupon(_)
            | Self::Checkout(_)
            | Self::Order(_)
            | Self::Inventory(_)
            | Self::Payment(_)
            | Self::Return(_)
            | Self::Wallet(_)
            | Self::Cart(_) => self
                .domain()
                .map(|d| d.kind().status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "request failed");
        }

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            code: self.code().to_string(),
            message: self.response_message(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use rust_decimal::Decimal;
    use sea_orm::DbErr;

    #[tokio::test]
    async fn domain_error_response_carries_code() {
        let response = ServiceError::from(OrderError::OrderAlreadyCancelled).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.code, "order_already_cancelled");
        assert_eq!(payload.message, "Order is already cancelled");
        assert_eq!(payload.error, "Conflict");
    }

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::from(CouponError::CouponNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::from(OrderError::Unauthorized).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::from(CheckoutError::EmptyCart).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::from(OrderError::CodLimitExceeded {
                limit: Decimal::ONE_THOUSAND
            })
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::from(PaymentError::GatewayOrderCreation("down".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ServiceError::from(PaymentError::InvalidSignature).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn service_error_response_message_hides_internal_details() {
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("relation orders missing".into()))
                .response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::Other(anyhow::anyhow!("secret path")).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::from(ReturnError::ReturnWindowExpired).response_message(),
            "Return window has expired"
        );
        assert_eq!(
            ServiceError::NotFound("Wallet".into()).response_message(),
            "Not found: Wallet"
        );
    }

    #[test]
    fn internal_errors_use_generic_code() {
        assert_eq!(
            ServiceError::InternalError("x".into()).code(),
            "internal_error"
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("x".into())).code(),
            "database_error"
        );
    }
}
