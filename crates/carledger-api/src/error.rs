//! Error types for carledger-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use carledger_core::error::ErrorCode;
use carledger_core::{CoreError, DefaultErrorLogger, ErrorContext, ErrorDetails, ErrorLogger};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e.code() {
                ErrorCode::CarNotFound => StatusCode::NOT_FOUND,
                ErrorCode::InvalidPayload => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn details(&self) -> ErrorDetails {
        match self {
            ApiError::BadRequest { message } => {
                ErrorDetails::new(ErrorCode::InvalidPayload, self.to_string())
                    .with_detail(serde_json::json!({ "reason": message }))
            }
            ApiError::Core(e) => e.to_details(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Core(ref e) = self {
            DefaultErrorLogger.log_error(e, &ErrorContext::new("http"));
        }
        (self.status(), Json(self.details())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
