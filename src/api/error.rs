use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::FinancingError;

/// API-layer error type
#[derive(Debug)]
pub enum ApiError {
    /// 400 - rejected request, whatever the cause
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::BadRequest(message) = self;
        tracing::warn!(error = %message, "request rejected");
        (StatusCode::BAD_REQUEST, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<FinancingError> for ApiError {
    fn from(err: FinancingError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

// unparsable bodies are client errors too, not 422
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
