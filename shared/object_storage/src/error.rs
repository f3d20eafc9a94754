//! Error types for storage operations

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while talking to a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error body returned by the storage REST API
    #[error("{message}")]
    Api {
        /// HTTP status code of the response
        status: u16,
        /// Message reported by the backend
        message: String,
    },

    /// Transport level failure of the HTTP client
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// Upstream service error (5xx from the backend)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    /// Bucket does not exist
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// Bucket or object already exists
    #[error("The resource already exists: {0}")]
    AlreadyExists(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Whether repeating the same request may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::UpstreamError(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::S3Error(_)
            | Self::BucketNotFound(_)
            | Self::AlreadyExists(_)
            | Self::ConfigError(_) => false,
        }
    }

    /// Maps an AWS SDK error onto the storage taxonomy
    ///
    /// `subject` names the bucket or key the request was about.
    pub(crate) fn from_sdk<E>(error: SdkError<E>, subject: &str) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    {
        if let SdkError::ServiceError(ref service_err) = error {
            match service_err.err().code() {
                Some("NoSuchBucket") => return Self::BucketNotFound(subject.to_string()),
                Some("BucketAlreadyExists" | "BucketAlreadyOwnedByYou" | "PreconditionFailed") => {
                    return Self::AlreadyExists(subject.to_string());
                }
                _ => {}
            }

            if service_err.raw().status().as_u16() >= 500 {
                return Self::UpstreamError(DisplayErrorContext(&error).to_string());
            }
        }

        Self::S3Error(DisplayErrorContext(&error).to_string())
    }
}
