use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use storefront_engine::{CheckoutError, NotificationError, OrderStoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Signature verification failed. {0}")]
    InvalidSignature(String),
    #[error("The request body is larger than the {0} byte limit")]
    PayloadTooLarge(usize),
    #[error("{0}")]
    Checkout(#[from] CheckoutError),
    #[error("{0}")]
    Notification(#[from] NotificationError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Checkout(e) => match e {
                CheckoutError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                CheckoutError::StoreNotFound(_) => StatusCode::NOT_FOUND,
                CheckoutError::ProductNotFound(_) => StatusCode::NOT_FOUND,
                CheckoutError::ProductNotInStore { .. } => StatusCode::BAD_REQUEST,
                CheckoutError::ProductNotPurchasable(_) => StatusCode::BAD_REQUEST,
                CheckoutError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                CheckoutError::GatewayError { .. } => StatusCode::BAD_GATEWAY,
                CheckoutError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            },
            // Anything other than 2xx makes the gateway redeliver, which is what we want for transient failures.
            Self::Notification(e) => match e {
                NotificationError::OrderNotFound(_) => StatusCode::NOT_FOUND,
                NotificationError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<OrderStoreError> for ServerError {
    fn from(e: OrderStoreError) -> Self {
        Self::BackendError(e.to_string())
    }
}
