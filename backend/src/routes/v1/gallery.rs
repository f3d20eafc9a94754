use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use crate::{
    gallery::{BucketLink, GalleryController, GalleryTile, StatusMessage},
    types::AppError,
};

#[derive(Debug, Serialize, JsonSchema)]
pub struct GalleryResponse {
    /// Bucket the images belong to
    pub bucket: String,
    /// Images under the upload prefix, in listing order
    pub images: Vec<GalleryTile>,
    /// Storage dashboard link, when one is configured
    pub bucket_link: Option<BucketLink>,
    /// Status line
    pub status: StatusMessage,
}

/// Lists the images of a bucket with their public URLs
///
/// A listing failure part way through is not an error: the images found up
/// to that point are returned.
///
/// # Errors
///
/// Returns a 400 when the bucket name is blank
#[instrument(skip(gallery))]
pub async fn load_gallery(
    Extension(gallery): Extension<Arc<GalleryController>>,
    Path(bucket): Path<String>,
) -> Result<Json<GalleryResponse>, AppError> {
    let loaded = gallery.load_gallery(&bucket).await?;

    Ok(Json(GalleryResponse {
        images: loaded.view.tiles().to_vec(),
        bucket: loaded.bucket,
        bucket_link: loaded.bucket_link,
        status: loaded.status,
    }))
}
