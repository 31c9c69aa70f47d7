//! Error responses for the HTTP adapter.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::slots::PanelError;

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Errors surfaced by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Panel(#[from] PanelError),

    /// A blocking task panicked or was cancelled.
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Panel(PanelError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Panel(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Panel(e) => e.kind(),
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl From<crate::slots::ValidationError> for ApiError {
    fn from(e: crate::slots::ValidationError) -> Self {
        ApiError::Panel(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::{SlotName, StorageError, ValidationError};

    #[test]
    fn test_status_mapping() {
        let validation = ApiError::from(ValidationError::MissingSlot(SlotName::Db1));
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(validation.error_type(), "validation_error");

        let storage = ApiError::Panel(PanelError::Storage(StorageError::UnsupportedVersion {
            path: "state.json".into(),
            found: 9,
            expected: 1,
        }));
        assert_eq!(storage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(storage.error_type(), "storage_error");
    }
}
