//! Status API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("non-positive amount")]
    NonPositiveAmount,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("unknown miner node id '{0}'")]
    UnknownMiner(String),
    #[error("this node does not run under PoA")]
    NotPoa,
    #[error("this node does not run under PoS")]
    NotPos,
    #[error("transaction rejected: {0}")]
    BadTransaction(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match self {
            GatewayError::NonPositiveAmount | GatewayError::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::UnknownMiner(_) => StatusCode::NOT_FOUND,
            GatewayError::NotPoa | GatewayError::NotPos => StatusCode::CONFLICT,
            GatewayError::BadTransaction(_) => StatusCode::BAD_REQUEST,
        };
        (status, axum::Json(json!({ "error": self.to_string() }))).into_response()
    }
}
