use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::{Json, http::StatusCode};
use serde_json::json;
use setup::{ErrorStatus, InvalidIdError};
use thiserror::Error;

/// Error for api endpoints. Rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Shop(#[from] shop::Error),

    #[error(transparent)]
    Auth(#[from] auth::Error),

    #[error(transparent)]
    InvalidId(#[from] InvalidIdError),

    #[error("Invalid request body")]
    InvalidBody(#[from] JsonRejection),
}

impl ErrorStatus for ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Shop(e) => e.status(),
            Self::Auth(e) => e.status(),
            Self::InvalidId(e) => e.status(),
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Error for the login and logout endpoints. Rendered as plain text.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error(transparent)]
    Auth(#[from] auth::Error),

    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to build response")]
    BuildResponse(#[from] http::Error),
}

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Auth(e) => e.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
