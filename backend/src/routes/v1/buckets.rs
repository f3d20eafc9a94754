use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    gallery::{GalleryController, StatusMessage},
    types::{AppError, ValidatedJson},
};

#[derive(Debug, Serialize, JsonSchema)]
pub struct BucketSummary {
    /// Bucket name
    pub name: String,
    /// Whether objects are publicly readable
    pub public: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BucketsResponse {
    /// Buckets in the order the backend lists them
    pub buckets: Vec<BucketSummary>,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct CreateBucketRequest {
    /// Bucket name, surrounding whitespace is ignored
    #[validate(length(max = 100, message = "Bucket name is too long."))]
    pub name: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CreateBucketResponse {
    /// Name the bucket was created with
    pub name: String,
    /// Status line
    pub status: StatusMessage,
}

/// Lists the buckets offered in the bucket selector
///
/// # Errors
///
/// Returns a 502 when the storage backend cannot list its buckets
#[instrument(skip(gallery))]
pub async fn list_buckets(
    Extension(gallery): Extension<Arc<GalleryController>>,
) -> Result<Json<BucketsResponse>, AppError> {
    let buckets = gallery.buckets().await?;

    Ok(Json(BucketsResponse {
        buckets: buckets
            .into_iter()
            .map(|bucket| BucketSummary {
                name: bucket.name,
                public: bucket.public,
            })
            .collect(),
    }))
}

/// Creates a public bucket
///
/// # Errors
///
/// Returns a 400 for a blank name, a 409 when the bucket already exists and a
/// 502 for any other backend failure
#[instrument(skip(gallery, payload))]
pub async fn create_bucket(
    Extension(gallery): Extension<Arc<GalleryController>>,
    ValidatedJson(payload): ValidatedJson<CreateBucketRequest>,
) -> Result<Json<CreateBucketResponse>, AppError> {
    let created = gallery.create_bucket(&payload.name).await?;

    Ok(Json(CreateBucketResponse {
        name: created.name,
        status: created.status,
    }))
}
