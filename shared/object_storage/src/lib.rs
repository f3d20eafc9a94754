//! Object storage adapters for the gallery service
//!
//! This crate defines the [`StorageClient`] contract the gallery consumes
//! (bucket listing and creation, object upload, paginated listing and public
//! URL resolution) together with its implementations:
//!
//! - [`SupabaseStorage`] talks to the Supabase Storage REST API
//! - [`S3Storage`] talks to any S3-compatible endpoint through the AWS SDK
//! - [`InMemoryStorage`] keeps everything in process, used for local runs and tests

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

mod error;
mod memory;
mod s3;
mod supabase;
mod types;

use async_trait::async_trait;
use bytes::Bytes;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryStorage;
pub use s3::S3Storage;
pub use supabase::SupabaseStorage;
pub use types::{
    Bucket, BucketOptions, ListOptions, ObjectEntry, SortBy, SortOrder, UploadOptions,
};

/// Operations the gallery needs from a storage backend
///
/// Every call is a single round trip to the backend. Implementations never
/// retry on their own and never cache results between calls.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Lists every bucket visible to the configured credentials
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend rejects the request
    async fn list_buckets(&self) -> StorageResult<Vec<Bucket>>;

    /// Creates a new bucket
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::AlreadyExists`] when the name is taken, or any
    /// other [`StorageError`] reported by the backend
    async fn create_bucket(&self, name: &str, options: BucketOptions) -> StorageResult<()>;

    /// Uploads `content` to `path` inside `bucket`
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::AlreadyExists`] when `upsert` is off and the
    /// object is present, or any other [`StorageError`] reported by the backend
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<()>;

    /// Lists one page of entries directly under `prefix`
    ///
    /// Entries for nested "folders" carry neither an id nor metadata.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the bucket is unknown or the backend
    /// rejects the request
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: &ListOptions,
    ) -> StorageResult<Vec<ObjectEntry>>;

    /// Builds the unauthenticated read URL for an object
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
