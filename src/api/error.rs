use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bota_core::CoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::GigNotFound(_)
            | CoreError::MusicianNotFound(_)
            | CoreError::AssignmentNotFound(_)
            | CoreError::MovementNotFound(_)
            | CoreError::AdvanceNotFound(_)
            | CoreError::ForecastItemNotFound(_) => ApiError::NotFound(err.to_string()),
            CoreError::InvalidFilter(_) | CoreError::Validation(_) | CoreError::Domain(_) => {
                ApiError::BadRequest(err.to_string())
            }
            CoreError::Storage(_) | CoreError::Serde(_) | CoreError::Io(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
