//! In-process storage backend
//!
//! Mirrors the listing semantics of Supabase Storage: keys are flat, but a
//! listing of `prefix` shows the first path segment below it, with deeper
//! keys collapsed into folder entries. Public URLs are `data:` URLs so the
//! gallery renders without any object server.
//!
//! Failures can be injected for a given listing offset or upload path, and
//! every call is counted, which is what the gallery tests rely on.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde_json::json;
use tracing::debug;

use crate::{
    Bucket, BucketOptions, ListOptions, ObjectEntry, SortOrder, StorageClient, StorageError,
    StorageResult, UploadOptions,
};

#[derive(Debug, Default)]
struct MemoryBucket {
    public: bool,
    objects: BTreeMap<String, StoredObject>,
}

#[derive(Debug)]
struct StoredObject {
    id: String,
    content: Bytes,
    content_type: String,
    cache_control: String,
}

#[derive(Debug, Default)]
struct Faults {
    /// Listing offset -> message
    list: HashMap<usize, String>,
    /// Path suffix -> message
    upload: Vec<(String, String)>,
}

/// Storage backend keeping buckets and objects in memory
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    buckets: Mutex<BTreeMap<String, MemoryBucket>>,
    faults: Mutex<Faults>,
    next_id: AtomicUsize,
    list_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    bucket_calls: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryStorage {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every listing call at `offset` fail with `message`
    pub fn fail_list_at(&self, offset: usize, message: impl Into<String>) {
        lock(&self.faults).list.insert(offset, message.into());
    }

    /// Makes every upload whose path ends with `suffix` fail with `message`
    pub fn fail_upload_of(&self, suffix: impl Into<String>, message: impl Into<String>) {
        lock(&self.faults)
            .upload
            .push((suffix.into(), message.into()));
    }

    /// Number of `list` calls served so far, failed ones included
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `upload` calls served so far, failed ones included
    #[must_use]
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Number of `list_buckets` and `create_bucket` calls served so far
    #[must_use]
    pub fn bucket_calls(&self) -> usize {
        self.bucket_calls.load(Ordering::SeqCst)
    }

    /// Keys stored in `bucket`, in name order
    #[must_use]
    pub fn object_paths(&self, bucket: &str) -> Vec<String> {
        lock(&self.buckets)
            .get(bucket)
            .map(|bucket| bucket.objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Content type stored with an object
    #[must_use]
    pub fn content_type_of(&self, bucket: &str, path: &str) -> Option<String> {
        lock(&self.buckets)
            .get(bucket)
            .and_then(|bucket| bucket.objects.get(path))
            .map(|object| object.content_type.clone())
    }
}

#[async_trait]
impl StorageClient for InMemoryStorage {
    async fn list_buckets(&self) -> StorageResult<Vec<Bucket>> {
        self.bucket_calls.fetch_add(1, Ordering::SeqCst);

        Ok(lock(&self.buckets)
            .iter()
            .map(|(name, bucket)| Bucket {
                name: name.clone(),
                public: bucket.public,
            })
            .collect())
    }

    async fn create_bucket(&self, name: &str, options: BucketOptions) -> StorageResult<()> {
        self.bucket_calls.fetch_add(1, Ordering::SeqCst);

        let mut buckets = lock(&self.buckets);
        if buckets.contains_key(name) {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }

        buckets.insert(
            name.to_string(),
            MemoryBucket {
                public: options.public,
                objects: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<()> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);

        if let Some((_, message)) = lock(&self.faults)
            .upload
            .iter()
            .find(|(suffix, _)| path.ends_with(suffix.as_str()))
        {
            return Err(StorageError::Api {
                status: 500,
                message: message.clone(),
            });
        }

        let mut buckets = lock(&self.buckets);
        let target = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;

        if !options.upsert && target.objects.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        debug!("Stored {bucket}/{path} ({} bytes)", content.len());
        target.objects.insert(
            path.to_string(),
            StoredObject {
                id: format!("{id:08x}"),
                content,
                content_type: options.content_type.clone(),
                cache_control: options.cache_control.clone(),
            },
        );
        Ok(())
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: &ListOptions,
    ) -> StorageResult<Vec<ObjectEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = lock(&self.faults).list.get(&options.offset) {
            return Err(StorageError::Api {
                status: 400,
                message: message.clone(),
            });
        }

        let buckets = lock(&self.buckets);
        let source = buckets
            .get(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;

        let trimmed = prefix.trim_matches('/');
        let key_prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}/")
        };

        let mut entries: BTreeMap<String, ObjectEntry> = BTreeMap::new();
        for (key, object) in source.objects.range(key_prefix.clone()..) {
            let Some(rest) = key.strip_prefix(key_prefix.as_str()) else {
                break;
            };

            match rest.split_once('/') {
                Some((folder, _)) => {
                    entries
                        .entry(folder.to_string())
                        .or_insert_with(|| ObjectEntry::folder(folder));
                }
                None => {
                    entries.insert(
                        rest.to_string(),
                        ObjectEntry {
                            name: rest.to_string(),
                            id: Some(object.id.clone()),
                            metadata: Some(json!({
                                "size": object.content.len(),
                                "mimetype": object.content_type,
                                "cacheControl": format!("max-age={}", object.cache_control),
                            })),
                        },
                    );
                }
            }
        }

        let ordered: Box<dyn Iterator<Item = ObjectEntry>> = match options.sort_by.order {
            SortOrder::Asc => Box::new(entries.into_values()),
            SortOrder::Desc => Box::new(entries.into_values().rev()),
        };

        Ok(ordered
            .skip(options.offset)
            .take(options.limit)
            .collect())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        lock(&self.buckets)
            .get(bucket)
            .and_then(|bucket| bucket.objects.get(path))
            .map_or_else(
                || format!("memory://{bucket}/{path}"),
                |object| {
                    format!(
                        "data:{};base64,{}",
                        object.content_type,
                        STANDARD.encode(&object.content)
                    )
                },
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SortBy;
    use pretty_assertions::assert_eq;

    fn window(offset: usize, limit: usize) -> ListOptions {
        ListOptions {
            limit,
            offset,
            sort_by: SortBy::name_ascending(),
        }
    }

    async fn seeded() -> InMemoryStorage {
        let storage = InMemoryStorage::new();
        storage
            .create_bucket("photos", BucketOptions { public: true })
            .await
            .unwrap();
        for path in [
            "uploads/b.png",
            "uploads/a.png",
            "uploads/thumbs/a.png",
            "other/c.png",
        ] {
            storage
                .upload(
                    "photos",
                    path,
                    Bytes::from_static(b"img"),
                    &UploadOptions::default(),
                )
                .await
                .unwrap();
        }
        storage
    }

    #[tokio::test]
    async fn test_listing_collapses_nested_keys_into_folders() {
        let storage = seeded().await;

        let entries = storage.list("photos", "uploads", &window(0, 100)).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "thumbs"]);

        assert!(entries[0].id.is_some());
        assert_eq!(entries[2], ObjectEntry::folder("thumbs"));
    }

    #[tokio::test]
    async fn test_listing_root_and_windows() {
        let storage = seeded().await;

        let root = storage.list("photos", "", &window(0, 100)).await.unwrap();
        let names: Vec<&str> = root.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["other", "uploads"]);

        let second = storage.list("photos", "uploads", &window(1, 1)).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "b.png");
    }

    #[tokio::test]
    async fn test_unknown_prefix_lists_nothing_and_unknown_bucket_fails() {
        let storage = seeded().await;

        assert!(storage
            .list("photos", "missing", &window(0, 100))
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            storage.list("nope", "uploads", &window(0, 100)).await,
            Err(StorageError::BucketNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_without_upsert_rejects_existing_object() {
        let storage = seeded().await;

        let result = storage
            .upload(
                "photos",
                "uploads/a.png",
                Bytes::from_static(b"again"),
                &UploadOptions::default(),
            )
            .await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));

        let upsert = UploadOptions {
            upsert: true,
            ..UploadOptions::default()
        };
        storage
            .upload("photos", "uploads/a.png", Bytes::from_static(b"again"), &upsert)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_injected_failures_and_call_counters() {
        let storage = seeded().await;
        storage.fail_list_at(0, "Bucket not found");
        storage.fail_upload_of("bad.png", "Payload too large");

        assert!(storage.list("photos", "uploads", &window(0, 10)).await.is_err());
        let error = storage
            .upload(
                "photos",
                "uploads/1-bad.png",
                Bytes::new(),
                &UploadOptions::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Payload too large");

        assert_eq!(storage.list_calls(), 1);
        assert_eq!(storage.upload_calls(), 5);
    }

    #[tokio::test]
    async fn test_public_url_is_a_data_url() {
        let storage = InMemoryStorage::new();
        storage
            .create_bucket("photos", BucketOptions { public: true })
            .await
            .unwrap();
        let options = UploadOptions {
            content_type: "image/png".to_string(),
            ..UploadOptions::default()
        };
        storage
            .upload("photos", "uploads/a.png", Bytes::from_static(b"png"), &options)
            .await
            .unwrap();

        assert_eq!(
            storage.public_url("photos", "uploads/a.png"),
            "data:image/png;base64,cG5n"
        );
        assert_eq!(
            storage.public_url("photos", "uploads/none.png"),
            "memory://photos/uploads/none.png"
        );
    }
}
