use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::validation::ValidationError;

pub const NOT_FOUND_MESSAGE: &str = "Bookmark Not Found";
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized request";
const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    source: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            source: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: UNAUTHORIZED_MESSAGE.to_string(),
            source: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: NOT_FOUND_MESSAGE.to_string(),
            source: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// 401 bodies carry a bare string; every other error nests it under `message`.
    fn body(&self) -> serde_json::Value {
        if self.status == StatusCode::UNAUTHORIZED {
            json!({ "error": self.message })
        } else {
            json!({ "error": { "message": self.message } })
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_MESSAGE.to_string(),
            source: Some(value),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_MESSAGE.to_string(),
            source: Some(value.into()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::bad_request(value.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(source) = &self.source {
            error!("{:?}", source);
        }
        (self.status, Json(self.body())).into_response()
    }
}
