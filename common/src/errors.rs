use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failure taxonomy for a weather lookup
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub const UPSTREAM_FAILURE: &str = "Weather service is temporarily unavailable";
pub const INTERNAL_FAILURE: &str = "Internal server error";

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::TimeoutError(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// Whether the failure came from a third-party API (network, status, or body).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::TimeoutError(_)
                | AppError::HttpError { .. }
                | AppError::NetworkError(_)
                | AppError::ParseError(_)
        )
    }

    /// Message safe to show to clients. Upstream and internal detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(message) | AppError::NotFound(message) => message.clone(),
            AppError::InternalError(_) => INTERNAL_FAILURE.to_string(),
            _ => UPSTREAM_FAILURE.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // Upstream failures are reported as a plain 500, not a gateway status.
            AppError::TimeoutError(_)
            | AppError::HttpError { .. }
            | AppError::NetworkError(_)
            | AppError::ParseError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(ErrorResponse {
            error: self.public_message(),
        });

        (status, body).into_response()
    }
}
