//! Gallery operations on top of a storage backend
//!
//! [`GalleryController`] is built once at startup and shared with every
//! handler. Each operation awaits its backend calls one after the other and
//! returns either an outcome carrying the status line to display, or a
//! [`GalleryError`] whose `Display` is that status line.

mod error;
pub mod lightbox;
pub mod listing;
pub mod render;
pub mod status;
pub mod upload;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use object_storage::{Bucket, BucketOptions, StorageClient};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{info, instrument};

pub use error::{BucketAction, GalleryError, GalleryResult};
pub use lightbox::{Lightbox, LightboxEvent};
pub use render::{GalleryTile, GalleryView};
pub use status::{StatusMessage, Tone};
pub use upload::{UploadFile, UploadFailure, UploadSummary};

use self::upload::UploadPolicy;

/// Prefix uploads are stored under and the gallery lists
pub const UPLOAD_PREFIX: &str = "uploads";

/// Entries requested per listing call
pub const LIST_PAGE_SIZE: usize = 100;

/// Cache lifetime of uploaded objects, in seconds
pub const UPLOAD_CACHE_CONTROL: &str = "3600";

/// Tunables of the gallery
#[derive(Debug, Clone)]
pub struct GallerySettings {
    /// Prefix uploads are stored under and the gallery lists
    pub prefix: String,
    /// Entries requested per listing call
    pub page_size: usize,
    /// Cache lifetime of uploaded objects, in seconds
    pub cache_control: String,
    /// Storage dashboard page linked next to a loaded bucket
    pub studio_url: Option<String>,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            prefix: UPLOAD_PREFIX.to_string(),
            page_size: LIST_PAGE_SIZE,
            cache_control: UPLOAD_CACHE_CONTROL.to_string(),
            studio_url: None,
        }
    }
}

/// Link to the storage dashboard for a bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct BucketLink {
    /// Dashboard URL
    pub href: String,
    /// Link text
    pub label: String,
}

/// A bucket was created
#[derive(Debug, Clone)]
pub struct CreatedBucket {
    /// Trimmed bucket name, selected after creation
    pub name: String,
    /// Status line
    pub status: StatusMessage,
}

/// An upload batch went through
#[derive(Debug, Clone)]
pub struct UploadReport {
    /// Destination paths in upload order
    pub paths: Vec<String>,
    /// Status line
    pub status: StatusMessage,
}

/// A gallery was loaded
#[derive(Debug, Clone)]
pub struct LoadedGallery {
    /// Bucket the gallery belongs to
    pub bucket: String,
    /// Tiles or placeholder
    pub view: GalleryView,
    /// Status line
    pub status: StatusMessage,
    /// Dashboard link shown once a bucket has been loaded
    pub bucket_link: Option<BucketLink>,
}

/// Gallery view-model and controller
pub struct GalleryController {
    storage: Arc<dyn StorageClient>,
    settings: GallerySettings,
    clock: fn() -> DateTime<Utc>,
}

impl GalleryController {
    /// Creates a controller over `storage`
    #[must_use]
    pub fn new(storage: Arc<dyn StorageClient>, settings: GallerySettings) -> Self {
        Self {
            storage,
            settings,
            clock: Utc::now,
        }
    }

    /// Replaces the time source used to timestamp upload paths
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Gallery tunables
    #[must_use]
    pub const fn settings(&self) -> &GallerySettings {
        &self.settings
    }

    /// Buckets offered in the bucket selector
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::ListBuckets` when the backend listing fails
    #[instrument(skip(self))]
    pub async fn buckets(&self) -> GalleryResult<Vec<Bucket>> {
        self.storage
            .list_buckets()
            .await
            .map_err(GalleryError::ListBuckets)
    }

    /// Creates a public bucket named `raw_name`, trimmed
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::EmptyBucketName` for a blank name, without
    /// calling the backend, or `GalleryError::CreateBucket` when the backend
    /// refuses the bucket
    #[instrument(skip(self))]
    pub async fn create_bucket(&self, raw_name: &str) -> GalleryResult<CreatedBucket> {
        let name = raw_name.trim();
        if name.is_empty() {
            return Err(GalleryError::EmptyBucketName);
        }

        self.storage
            .create_bucket(name, BucketOptions { public: true })
            .await
            .map_err(GalleryError::CreateBucket)?;

        info!("Created public bucket {name}");
        Ok(CreatedBucket {
            name: name.to_string(),
            status: StatusMessage::ok(format!("Bucket \"{name}\" created (public).")),
        })
    }

    /// Uploads `files` into `bucket`, one at a time
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::NoBucketSelected` for a blank bucket, without
    /// calling the backend, or `GalleryError::Upload` for the first failing file
    #[instrument(skip(self, files), fields(files = files.len()))]
    pub async fn upload_files(
        &self,
        bucket: &str,
        files: Vec<UploadFile>,
    ) -> GalleryResult<UploadReport> {
        let bucket = bucket.trim();
        if bucket.is_empty() {
            return Err(GalleryError::NoBucketSelected(BucketAction::Upload));
        }

        if files.is_empty() {
            return Ok(UploadReport {
                paths: Vec::new(),
                status: StatusMessage::info("No files selected."),
            });
        }

        let policy = UploadPolicy {
            prefix: self.settings.prefix.clone(),
            cache_control: self.settings.cache_control.clone(),
        };
        let summary =
            upload::upload_sequentially(self.storage.as_ref(), bucket, files, &policy, self.clock)
                .await?;

        Ok(UploadReport {
            status: StatusMessage::ok(format!(
                "Uploaded {} file(s). Click \"Load Gallery\" to view.",
                summary.count()
            )),
            paths: summary.paths,
        })
    }

    /// Lists the images of `bucket` and resolves their public URLs
    ///
    /// Listing failures are not errors: they end the listing early and the
    /// gallery shows what was found up to that point.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::NoBucketSelected` for a blank bucket
    #[instrument(skip(self))]
    pub async fn load_gallery(&self, bucket: &str) -> GalleryResult<LoadedGallery> {
        let bucket = bucket.trim();
        if bucket.is_empty() {
            return Err(GalleryError::NoBucketSelected(BucketAction::LoadGallery));
        }

        let paths = listing::list_image_paths(
            self.storage.as_ref(),
            bucket,
            &self.settings.prefix,
            self.settings.page_size,
        )
        .await;

        let view = render::render_gallery(self.storage.as_ref(), bucket, &paths);
        let status = match &view {
            GalleryView::Empty => StatusMessage::info(format!(
                "No images found in this bucket (under {}/).",
                self.settings.prefix
            )),
            GalleryView::Tiles(tiles) => StatusMessage::ok(format!("Loaded {} image(s).", tiles.len())),
        };

        Ok(LoadedGallery {
            bucket: bucket.to_string(),
            view,
            status,
            bucket_link: self.bucket_link(bucket),
        })
    }

    /// Dashboard link for `bucket`, when a dashboard is configured
    #[must_use]
    pub fn bucket_link(&self, bucket: &str) -> Option<BucketLink> {
        let href = self.settings.studio_url.as_ref()?;
        if bucket.is_empty() {
            return None;
        }

        Some(BucketLink {
            href: href.clone(),
            label: format!("Open “{bucket}” in Supabase Studio"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::TimeZone;
    use object_storage::{InMemoryStorage, UploadOptions};
    use pretty_assertions::assert_eq;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn controller(storage: &Arc<InMemoryStorage>) -> GalleryController {
        let settings = GallerySettings {
            studio_url: Some("http://localhost:54323/project/default/storage/buckets".to_string()),
            ..GallerySettings::default()
        };
        GalleryController::new(storage.clone(), settings).with_clock(fixed_clock)
    }

    fn png(name: &str) -> UploadFile {
        UploadFile {
            name: name.to_string(),
            content: Bytes::from_static(b"png"),
            content_type: Some("image/png".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_bucket_trims_and_reports() {
        let storage = Arc::new(InMemoryStorage::new());
        let gallery = controller(&storage);

        let created = gallery.create_bucket("  photos ").await.unwrap();
        assert_eq!(created.name, "photos");
        assert_eq!(created.status, StatusMessage::ok("Bucket \"photos\" created (public)."));

        let buckets = gallery.buckets().await.unwrap();
        assert_eq!(buckets.len(), 1);
        assert!(buckets[0].public);
    }

    #[tokio::test]
    async fn test_blank_bucket_name_never_reaches_the_backend() {
        let storage = Arc::new(InMemoryStorage::new());
        let gallery = controller(&storage);

        let error = gallery.create_bucket("   ").await.unwrap_err();
        assert!(matches!(error, GalleryError::EmptyBucketName));
        assert_eq!(error.status(), StatusMessage::error("Please enter a bucket name."));
        assert_eq!(storage.bucket_calls(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_bucket_reports_backend_message() {
        let storage = Arc::new(InMemoryStorage::new());
        let gallery = controller(&storage);
        gallery.create_bucket("photos").await.unwrap();

        let error = gallery.create_bucket("photos").await.unwrap_err();
        assert_eq!(error.to_string(), "Error: The resource already exists: photos");
    }

    #[tokio::test]
    async fn test_upload_without_bucket_makes_no_backend_call() {
        let storage = Arc::new(InMemoryStorage::new());
        let gallery = controller(&storage);

        let error = gallery.upload_files("", vec![png("a.png")]).await.unwrap_err();
        assert_eq!(error.to_string(), "Select a bucket before uploading.");
        assert!(error.is_input_error());
        assert_eq!(storage.upload_calls(), 0);
        assert_eq!(storage.bucket_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_then_load_gallery() {
        let storage = Arc::new(InMemoryStorage::new());
        let gallery = controller(&storage);
        gallery.create_bucket("photos").await.unwrap();

        let report = gallery
            .upload_files("photos", vec![png("a.png"), png("b.png")])
            .await
            .unwrap();
        assert_eq!(
            report.status,
            StatusMessage::ok("Uploaded 2 file(s). Click \"Load Gallery\" to view.")
        );

        let loaded = gallery.load_gallery("photos").await.unwrap();
        assert_eq!(loaded.status, StatusMessage::ok("Loaded 2 image(s)."));
        let captions: Vec<&str> = loaded
            .view
            .tiles()
            .iter()
            .map(|tile| tile.caption.as_str())
            .collect();
        assert_eq!(captions, vec!["1700000000000-a.png", "1700000000000-b.png"]);
        assert_eq!(
            loaded.bucket_link.unwrap().label,
            "Open “photos” in Supabase Studio"
        );
    }

    #[tokio::test]
    async fn test_upload_failure_reports_partial_progress() {
        let storage = Arc::new(InMemoryStorage::new());
        storage.fail_upload_of("-b.png", "Payload too large");
        let gallery = controller(&storage);
        gallery.create_bucket("photos").await.unwrap();

        let error = gallery
            .upload_files("photos", vec![png("a.png"), png("b.png"), png("c.png")])
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Upload failed: Payload too large");
        match error {
            GalleryError::Upload(failure) => assert_eq!(failure.uploaded.len(), 1),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(storage.upload_calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_gallery_shows_placeholder_and_link() {
        let storage = Arc::new(InMemoryStorage::new());
        let gallery = controller(&storage);
        gallery.create_bucket("photos").await.unwrap();
        storage
            .upload(
                "photos",
                "uploads/notes.txt",
                Bytes::from_static(b"text"),
                &UploadOptions::default(),
            )
            .await
            .unwrap();

        let loaded = gallery.load_gallery("photos").await.unwrap();
        assert_eq!(loaded.view, GalleryView::Empty);
        assert_eq!(
            loaded.status,
            StatusMessage::info("No images found in this bucket (under uploads/).")
        );
        assert!(loaded.bucket_link.is_some());
    }

    #[tokio::test]
    async fn test_unknown_bucket_loads_as_empty_gallery() {
        let storage = Arc::new(InMemoryStorage::new());
        let gallery = controller(&storage);

        let loaded = gallery.load_gallery("missing").await.unwrap();
        assert_eq!(loaded.view, GalleryView::Empty);
    }

    #[tokio::test]
    async fn test_load_gallery_requires_a_bucket() {
        let storage = Arc::new(InMemoryStorage::new());
        let gallery = controller(&storage);

        let error = gallery.load_gallery(" ").await.unwrap_err();
        assert_eq!(error.to_string(), "Select a bucket to load the gallery.");
        assert_eq!(storage.list_calls(), 0);
    }

    #[test]
    fn test_no_link_without_dashboard() {
        let gallery = GalleryController::new(
            Arc::new(InMemoryStorage::new()),
            GallerySettings::default(),
        );
        assert_eq!(gallery.bucket_link("photos"), None);
    }
}
