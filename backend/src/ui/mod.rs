//! HTML front end
//!
//! Every handler renders the whole page. Operation failures never become HTTP
//! errors here: they are shown in the status line next to the control that
//! triggered them.

pub mod page;

use std::sync::Arc;

use aide::axum::ApiRouter;
use axum::{
    extract::Query,
    routing::{get, post},
    Extension, Form,
};
use maud::Markup;
use serde::Deserialize;
use tracing::instrument;

use crate::{gallery::GalleryController, types::UploadForm};

pub use page::PageState;

/// Creates the router serving the HTML page
#[must_use]
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .route("/", get(index))
        .route("/gallery", get(gallery))
        .route("/buckets", post(create_bucket))
        .route("/uploads", post(upload))
}

#[derive(Debug, Deserialize)]
struct GalleryQuery {
    #[serde(default)]
    bucket: String,
    view: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateBucketForm {
    #[serde(default)]
    name: String,
}

impl PageState {
    /// Fills the bucket selector, reporting a listing failure in the bucket
    /// status line
    async fn with_buckets(mut self, gallery: &GalleryController) -> Self {
        match gallery.buckets().await {
            Ok(buckets) => self.buckets = buckets,
            Err(e) => self.create_status = Some(e.status()),
        }
        self
    }
}

#[instrument(skip(gallery))]
async fn index(Extension(gallery): Extension<Arc<GalleryController>>) -> Markup {
    page::render(&PageState::default().with_buckets(&gallery).await)
}

#[instrument(skip(gallery))]
async fn gallery(
    Extension(gallery): Extension<Arc<GalleryController>>,
    Query(query): Query<GalleryQuery>,
) -> Markup {
    let mut state = PageState {
        selected: query.bucket.trim().to_string(),
        ..PageState::default()
    };

    match gallery.load_gallery(&query.bucket).await {
        Ok(loaded) => {
            if let Some(path) = &query.view {
                loaded.view.open_in(&mut state.lightbox, path);
            }
            state.upload_status = Some(loaded.status);
            state.bucket_link = loaded.bucket_link;
            state.gallery = Some(loaded.view);
        }
        Err(e) => state.upload_status = Some(e.status()),
    }

    page::render(&state.with_buckets(&gallery).await)
}

#[instrument(skip(gallery, form))]
async fn create_bucket(
    Extension(gallery): Extension<Arc<GalleryController>>,
    Form(form): Form<CreateBucketForm>,
) -> Markup {
    let mut state = PageState::default();

    match gallery.create_bucket(&form.name).await {
        Ok(created) => {
            state.selected = created.name;
            state.create_status = Some(created.status);
        }
        Err(e) => state.create_status = Some(e.status()),
    }

    page::render(&state.with_buckets(&gallery).await)
}

#[instrument(skip(gallery, form), fields(files = form.files.len()))]
async fn upload(Extension(gallery): Extension<Arc<GalleryController>>, form: UploadForm) -> Markup {
    let bucket = form.bucket.unwrap_or_default();
    let mut state = PageState {
        selected: bucket.trim().to_string(),
        ..PageState::default()
    };

    state.upload_status = Some(match gallery.upload_files(&bucket, form.files).await {
        Ok(report) => report.status,
        Err(e) => e.status(),
    });

    page::render(&state.with_buckets(&gallery).await)
}
