//! Error types for gallery operations

use std::fmt;

use object_storage::StorageError;
use thiserror::Error;

use super::{status::StatusMessage, upload::UploadFailure};

/// Result type for gallery operations
pub type GalleryResult<T> = Result<T, GalleryError>;

/// Operation that needs a selected bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketAction {
    /// Uploading files
    Upload,
    /// Loading the gallery
    LoadGallery,
}

impl fmt::Display for BucketAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => f.write_str("Select a bucket before uploading."),
            Self::LoadGallery => f.write_str("Select a bucket to load the gallery."),
        }
    }
}

/// Errors that can occur during gallery operations
///
/// The `Display` output is the status line shown to the user.
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Bucket name was blank after trimming
    #[error("Please enter a bucket name.")]
    EmptyBucketName,

    /// No bucket selected for an operation that needs one
    #[error("{0}")]
    NoBucketSelected(BucketAction),

    /// Bucket listing failed
    #[error("Failed to load buckets: {0}")]
    ListBuckets(#[source] StorageError),

    /// Backend refused to create the bucket
    #[error("Error: {0}")]
    CreateBucket(#[source] StorageError),

    /// Upload batch stopped at a failing file
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadFailure),
}

impl GalleryError {
    /// Whether the user, not the backend, is at fault
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::EmptyBucketName | Self::NoBucketSelected(_))
    }

    /// Backend error behind this failure, if any
    #[must_use]
    pub const fn storage_error(&self) -> Option<&StorageError> {
        match self {
            Self::ListBuckets(e) | Self::CreateBucket(e) => Some(e),
            Self::Upload(failure) => Some(&failure.source),
            Self::EmptyBucketName | Self::NoBucketSelected(_) => None,
        }
    }

    /// Status line for this error
    #[must_use]
    pub fn status(&self) -> StatusMessage {
        StatusMessage::error(self.to_string())
    }
}
