use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use blink_core::ShortenerError;
use thiserror::Error;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// The request body could not be read as the expected JSON.
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Shortener(e) => match e {
                ShortenerError::InvalidUrl(_) | ShortenerError::InvalidShortCode(_) => {
                    (StatusCode::BAD_REQUEST, e.to_string())
                }
                ShortenerError::AliasConflict(_) => (StatusCode::CONFLICT, e.to_string()),
                ShortenerError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, "short URL not found".to_string())
                }
                ShortenerError::Storage(detail) => {
                    error!(error = %detail, "Request failed on storage");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();
        (status, Json(ErrorResponse { error })).into_response()
    }
}
