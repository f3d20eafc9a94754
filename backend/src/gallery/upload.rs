//! Sequential upload of user-selected files

use bytes::Bytes;
use chrono::{DateTime, Utc};
use object_storage::{StorageClient, StorageError, UploadOptions};
use tracing::{info, instrument, warn};

/// A file picked or dropped by the user
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name
    pub name: String,
    /// File content
    pub content: Bytes,
    /// MIME type reported by the client, if any
    pub content_type: Option<String>,
}

/// Outcome of an upload batch that went through completely
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    /// Destination paths, in upload order
    pub paths: Vec<String>,
}

impl UploadSummary {
    /// Number of files uploaded
    #[must_use]
    pub fn count(&self) -> usize {
        self.paths.len()
    }
}

/// An upload batch stopped by a backend failure
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct UploadFailure {
    /// Name of the file whose upload failed
    pub file_name: String,
    /// Paths uploaded before the failure, which stay in place
    pub uploaded: Vec<String>,
    /// Error reported by the backend
    #[source]
    pub source: StorageError,
}

/// Fixed options of every upload
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Prefix uploads land under
    pub prefix: String,
    /// Cache lifetime in seconds
    pub cache_control: String,
}

/// Destination of a file uploaded at `now`: `<prefix>/<unix-millis>-<name>`
#[must_use]
pub fn upload_path(prefix: &str, now: DateTime<Utc>, file_name: &str) -> String {
    format!("{prefix}/{}-{file_name}", now.timestamp_millis())
}

/// Uploads `files` one after the other, stopping at the first failure
///
/// Files uploaded before a failure are not removed, files after it are never
/// attempted. `clock` is read once per file to build its destination path.
///
/// # Errors
///
/// Returns an [`UploadFailure`] carrying the backend error and the paths that
/// made it before the failing file
#[instrument(skip(storage, files, policy, clock), fields(files = files.len()))]
pub async fn upload_sequentially(
    storage: &dyn StorageClient,
    bucket: &str,
    files: Vec<UploadFile>,
    policy: &UploadPolicy,
    clock: fn() -> DateTime<Utc>,
) -> Result<UploadSummary, UploadFailure> {
    let mut uploaded = Vec::with_capacity(files.len());

    for file in files {
        let path = upload_path(&policy.prefix, clock(), &file.name);
        let options = UploadOptions {
            cache_control: policy.cache_control.clone(),
            upsert: false,
            content_type: file
                .content_type
                .filter(|content_type| !content_type.is_empty())
                .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string()),
        };

        if let Err(source) = storage.upload(bucket, &path, file.content, &options).await {
            warn!(
                "Upload of {} to {bucket} failed after {} file(s): {source}",
                file.name,
                uploaded.len()
            );
            return Err(UploadFailure {
                file_name: file.name,
                uploaded,
                source,
            });
        }

        uploaded.push(path);
    }

    info!("Uploaded {} file(s) to {bucket}", uploaded.len());
    Ok(UploadSummary { paths: uploaded })
}
