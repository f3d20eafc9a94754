//! Turns listed image paths into gallery tiles

use object_storage::StorageClient;
use schemars::JsonSchema;
use serde::Serialize;

use super::lightbox::Lightbox;

/// Heading of the empty gallery placeholder
pub const PLACEHOLDER_TITLE: &str = "Your images will appear here.";

/// Hint under the empty gallery placeholder
pub const PLACEHOLDER_HINT: &str = "Select a bucket and click Load Gallery to begin.";

/// One clickable thumbnail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct GalleryTile {
    /// Object path inside the bucket
    pub path: String,
    /// Public URL of the image
    pub url: String,
    /// Last segment of the path
    pub caption: String,
}

/// What the gallery area shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryView {
    /// Nothing to show, render the placeholder
    Empty,
    /// Thumbnails in listing order
    Tiles(Vec<GalleryTile>),
}

impl GalleryView {
    /// Tiles of the view, empty for the placeholder
    #[must_use]
    pub fn tiles(&self) -> &[GalleryTile] {
        match self {
            Self::Empty => &[],
            Self::Tiles(tiles) => tiles,
        }
    }

    /// Opens `lightbox` on the tile stored at `path`, if the view has one
    pub fn open_in(&self, lightbox: &mut Lightbox, path: &str) -> bool {
        match self.tiles().iter().find(|tile| tile.path == path) {
            Some(tile) => {
                lightbox.open(tile.url.clone(), Some(&tile.caption));
                true
            }
            None => false,
        }
    }
}

/// Caption of an object path: its final `/` segment
#[must_use]
pub fn caption_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Resolves a public URL for every path, eagerly
#[must_use]
pub fn render_gallery(storage: &dyn StorageClient, bucket: &str, paths: &[String]) -> GalleryView {
    if paths.is_empty() {
        return GalleryView::Empty;
    }

    GalleryView::Tiles(
        paths
            .iter()
            .map(|path| GalleryTile {
                path: path.clone(),
                url: storage.public_url(bucket, path),
                caption: caption_of(path).to_string(),
            })
            .collect(),
    )
}
