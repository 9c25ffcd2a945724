//! API error responses

use crate::state::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cardchess_core::RulesError;
use serde_json::json;

/// Error returned by the game handlers, rendered as `{ok: false, error}`
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    BadRequest(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Conflict { .. }) | ApiError::Store(StoreError::NothingToPlay) => {
                StatusCode::CONFLICT
            }
            ApiError::Store(StoreError::Rules(RulesError::IllegalIntent(_))) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(StoreError::Rules(RulesError::InvariantViolation(_))) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Store(err) => err.to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{}", message);
        } else {
            tracing::warn!("Rejected request: {}", message);
        }

        (status, Json(json!({ "ok": false, "error": message }))).into_response()
    }
}
