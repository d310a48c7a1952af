use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{contact::FieldError, directory::DirectoryError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Please correct the highlighted fields")]
    InvalidForm(Vec<FieldError>),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Failed to load data: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidForm(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Directory(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) | AppError::Snapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // client mistakes are "fail", anything on our side is "error"
        let kind = if status.is_client_error() { "fail" } else { "error" };

        if status.is_server_error() {
            tracing::error!(%status, "{self}");
        }

        let body = match &self {
            AppError::InvalidForm(errors) => json!({
                "status": kind,
                "message": self.to_string(),
                "errors": errors,
                "focus": errors.first().map(|e| e.field),
            }),
            _ => json!({
                "status": kind,
                "message": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
