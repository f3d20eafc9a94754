//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use object_storage::StorageError;
use schemars::JsonSchema;
use serde::Serialize;

use crate::gallery::GalleryError;

/// API error response envelope
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
    /// Progress of an upload batch that stopped at a failing file
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<UploadFailureDetails>,
}

/// Partial progress of a failed upload batch
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadFailureDetails {
    /// File whose upload failed
    pub failed_file: String,
    /// Number of files stored before the failure
    pub uploaded: usize,
    /// Paths stored before the failure, which stay in place
    pub paths: Vec<String>,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message, the same text the page shows
    pub message: String,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(
        status: StatusCode,
        code: &'static str,
        msg: impl Into<String>,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody {
                    code,
                    message: msg.into(),
                },
                details: None,
            },
        }
    }

    /// Bad request carrying a validation error code
    ///
    /// `code` doubles as the message when `msg` is empty.
    #[must_use]
    pub fn validation_from_str(msg: &str, code: &str) -> Self {
        let message = if msg.is_empty() { code } else { msg };
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message, false)
    }

    /// Attaches the progress of a failed upload batch
    #[must_use]
    pub fn with_details(mut self, details: UploadFailureDetails) -> Self {
        self.inner.details = Some(details);
        self
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Human-readable message of the error
    #[must_use]
    pub fn message(&self) -> &str {
        &self.inner.error.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert gallery errors to application errors
impl From<GalleryError> for AppError {
    fn from(err: GalleryError) -> Self {
        let message = err.to_string();

        let Some(storage_err) = err.storage_error() else {
            return Self::new(StatusCode::BAD_REQUEST, "invalid_input", message, false);
        };

        let app_err = match storage_err {
            StorageError::AlreadyExists(_) => {
                Self::new(StatusCode::CONFLICT, "already_exists", message, false)
            }
            StorageError::BucketNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "bucket_not_found", message, false)
            }
            StorageError::ConfigError(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                false,
            ),
            other => Self::new(
                StatusCode::BAD_GATEWAY,
                "storage_error",
                message,
                other.is_retryable(),
            ),
        };

        if let GalleryError::Upload(failure) = err {
            app_err.with_details(UploadFailureDetails {
                failed_file: failure.file_name,
                uploaded: failure.uploaded.len(),
                paths: failure.uploaded,
            })
        } else {
            app_err
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
