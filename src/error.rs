use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("no correlation key in payload (transaction_id, utr or order id required)")]
    MissingCorrelationKey,

    #[error("no status field in payload")]
    MissingStatus,

    #[error("invalid webhook signature")]
    InvalidSignature,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("consistency error: {0}")]
    Consistency(String),

    #[error("wallet credit error: {0}")]
    WalletCredit(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
            AppError::MissingCorrelationKey => StatusCode::BAD_REQUEST,
            AppError::MissingStatus => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AppError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Consistency(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Never surfaced to callers; mapped here for completeness.
            AppError::WalletCredit(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
