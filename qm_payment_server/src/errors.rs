use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use qm_payment_engine::traits::CheckoutError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("The request body was invalid. {0}")]
    ValidationError(String),
    #[error("The requested record does not exist. {0}")]
    NoRecordFound(String),
    #[error("The request conflicts with the current order state. {0}")]
    RequestConflict(String),
    #[error("The payment provider could not fulfil the request. {0}")]
    PaymentProviderError(String),
    #[error("The server is misconfigured. {0}")]
    ConfigurationError(String),
    #[error("A database error occurred. {0}")]
    BackendError(String),
    #[error("An IO error occurred. {0}")]
    IOError(#[from] std::io::Error),
    #[error("An unexpected error occurred. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ServerError::NoRecordFound(_) => StatusCode::NOT_FOUND,
            ServerError::RequestConflict(_) => StatusCode::CONFLICT,
            ServerError::PaymentProviderError(_) => StatusCode::BAD_GATEWAY,
            ServerError::InitializeError(_) |
            ServerError::ConfigurationError(_) |
            ServerError::BackendError(_) |
            ServerError::IOError(_) |
            ServerError::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse { error: self.to_string() })
    }
}

#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<CheckoutError> for ServerError {
    fn from(e: CheckoutError) -> Self {
        match &e {
            CheckoutError::OrderNotFound(_) => ServerError::NoRecordFound(e.to_string()),
            CheckoutError::OrderNotPending(_, _) | CheckoutError::OrderAlreadyExists(_) => {
                ServerError::RequestConflict(e.to_string())
            },
            CheckoutError::ProductNotFound(_) => ServerError::ValidationError(e.to_string()),
            CheckoutError::DatabaseError(_) => ServerError::BackendError(e.to_string()),
        }
    }
}
