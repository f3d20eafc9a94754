use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;

use crate::gallery::{listing::IMAGE_EXTENSIONS, GalleryController};

#[derive(Serialize, JsonSchema)]
pub struct ConfigResponse {
    /// Prefix uploads are stored under and the gallery lists
    prefix: String,
    /// Entries requested per listing call
    page_size: usize,
    /// Lowercase extensions shown in the gallery
    image_extensions: Vec<String>,
}

#[allow(clippy::unused_async)]
pub async fn get_config(
    Extension(gallery): Extension<Arc<GalleryController>>,
) -> Json<ConfigResponse> {
    let settings = gallery.settings();
    Json(ConfigResponse {
        prefix: settings.prefix.clone(),
        page_size: settings.page_size,
        image_extensions: IMAGE_EXTENSIONS.iter().map(ToString::to_string).collect(),
    })
}
