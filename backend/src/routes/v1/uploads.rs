use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use crate::{
    gallery::{GalleryController, StatusMessage},
    types::{AppError, UploadForm},
};

#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadResponse {
    /// Number of files stored
    pub uploaded: usize,
    /// Destination paths in upload order
    pub paths: Vec<String>,
    /// Status line
    pub status: StatusMessage,
}

/// Uploads the `files` parts of a multipart body into `bucket`
///
/// Files are stored one at a time under the upload prefix, each named
/// `<millis>-<original name>`. The first failure stops the batch; files
/// stored before it are kept.
///
/// # Errors
///
/// Returns a 409 when a destination path is already taken and a 502 for any
/// other backend failure
#[instrument(skip(gallery, form), fields(files = form.files.len()))]
pub async fn upload_files(
    Extension(gallery): Extension<Arc<GalleryController>>,
    Path(bucket): Path<String>,
    form: UploadForm,
) -> Result<Json<UploadResponse>, AppError> {
    let report = gallery.upload_files(&bucket, form.files).await?;

    Ok(Json(UploadResponse {
        uploaded: report.paths.len(),
        paths: report.paths,
        status: report.status,
    }))
}
