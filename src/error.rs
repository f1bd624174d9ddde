//! Error types shared across the crate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::process::ExitStatus;
use uuid::Uuid;

/// Failures surfaced to the caller of an ingestion or thumbnail upload.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("video {0} not found")]
    NotFound(Uuid),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("processing failed: {0}")]
    Processing(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IngestError {
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Internal(format!("{}: {}", context, err))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::BadRequest(_) => StatusCode::BAD_REQUEST,
            IngestError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            IngestError::NotFound(_) => StatusCode::NOT_FOUND,
            IngestError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            IngestError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            IngestError::Processing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            IngestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            IngestError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Something went wrong".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Failures of an external media tool.
#[derive(Debug, thiserror::Error)]
pub enum MediaToolError {
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("failed to parse {tool} output: {source}")]
    Parse {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}
