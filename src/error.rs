use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::models::order::OrderStatus;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("order {0} not found")]
    OrderNotFound(String),

    #[error("order {order_id} cannot be cancelled while {}", .status.as_str())]
    InvalidTransition {
        order_id: String,
        status: OrderStatus,
    },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
