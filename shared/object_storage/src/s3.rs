//! S3-compatible storage client

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::{
    primitives::{ByteStream, DateTimeFormat},
    types::{BucketLocationConstraint, CreateBucketConfiguration},
    Client as S3Client,
};
use bytes::Bytes;
use serde_json::json;
use tracing::{debug, info, instrument};
use url::Url;

use crate::{
    Bucket, BucketOptions, ListOptions, ObjectEntry, SortOrder, StorageClient, StorageError,
    StorageResult, UploadOptions,
};

/// Region where S3 rejects an explicit location constraint
const DEFAULT_REGION: &str = "us-east-1";

/// Storage client for S3 and S3-compatible endpoints (`LocalStack`, `MinIO`)
///
/// S3 has no offset-based listing, so [`StorageClient::list`] walks every key
/// under the prefix and cuts the requested window out of the name-sorted
/// result.
pub struct S3Storage {
    s3_client: Arc<S3Client>,
    public_base_url: Url,
}

impl S3Storage {
    /// Creates a new S3 storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `public_base_url` - Base URL objects are publicly served from,
    ///   path-style (`<base>/<bucket>/<key>`)
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` if the base URL is not a
    /// hierarchical URL
    pub fn new(s3_client: Arc<S3Client>, public_base_url: &str) -> StorageResult<Self> {
        let public_base_url = Url::parse(public_base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                StorageError::ConfigError(format!("Invalid S3 public URL: {public_base_url}"))
            })?;

        Ok(Self {
            s3_client,
            public_base_url,
        })
    }

    /// Grants anonymous `GetObject` on every key of the bucket
    async fn make_public(&self, name: &str) -> StorageResult<()> {
        let policy = json!({
            "Version": "2012-10-17",
            "Statement": [{
                "Sid": "PublicRead",
                "Effect": "Allow",
                "Principal": "*",
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{name}/*")]
            }]
        });

        self.s3_client
            .put_bucket_policy()
            .bucket(name)
            .policy(policy.to_string())
            .send()
            .await
            .map_err(|e| StorageError::from_sdk(e, name))?;

        Ok(())
    }
}

/// Key prefix S3 must be queried with for a folder-like `prefix`
fn key_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

/// Cuts the `[offset, offset + limit)` window out of a name-sorted listing
fn paginate(mut entries: Vec<ObjectEntry>, options: &ListOptions) -> Vec<ObjectEntry> {
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    if options.sort_by.order == SortOrder::Desc {
        entries.reverse();
    }

    entries
        .into_iter()
        .skip(options.offset)
        .take(options.limit)
        .collect()
}

#[async_trait]
impl StorageClient for S3Storage {
    #[instrument(skip(self))]
    async fn list_buckets(&self) -> StorageResult<Vec<Bucket>> {
        let output = self
            .s3_client
            .list_buckets()
            .send()
            .await
            .map_err(|e| StorageError::from_sdk(e, "*"))?;

        // S3 does not report public access in the bucket listing
        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name())
            .map(|name| Bucket {
                name: name.to_string(),
                public: false,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn create_bucket(&self, name: &str, options: BucketOptions) -> StorageResult<()> {
        let mut request = self.s3_client.create_bucket().bucket(name);

        if let Some(region) = self.s3_client.config().region() {
            if region.as_ref() != DEFAULT_REGION {
                request = request.create_bucket_configuration(
                    CreateBucketConfiguration::builder()
                        .location_constraint(BucketLocationConstraint::from(region.as_ref()))
                        .build(),
                );
            }
        }

        request
            .send()
            .await
            .map_err(|e| StorageError::from_sdk(e, name))?;

        if options.public {
            self.make_public(name).await?;
        }

        info!("Created S3 bucket {name} (public: {})", options.public);
        Ok(())
    }

    #[instrument(skip(self, content, options), fields(size = content.len()))]
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<()> {
        let mut request = self
            .s3_client
            .put_object()
            .bucket(bucket)
            .key(path)
            .body(ByteStream::from(content))
            .cache_control(format!("max-age={}", options.cache_control))
            .content_type(&options.content_type);

        if !options.upsert {
            request = request.if_none_match("*");
        }

        request
            .send()
            .await
            .map_err(|e| StorageError::from_sdk(e, path))?;

        Ok(())
    }

    #[instrument(skip(self, options), fields(offset = options.offset, limit = options.limit))]
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: &ListOptions,
    ) -> StorageResult<Vec<ObjectEntry>> {
        let key_prefix = key_prefix(prefix);
        let mut pages = self
            .s3_client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(&key_prefix)
            .delimiter("/")
            .into_paginator()
            .send();

        let mut entries = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| StorageError::from_sdk(e, bucket))?;

            for common_prefix in page.common_prefixes() {
                let Some(folder) = common_prefix
                    .prefix()
                    .and_then(|p| p.strip_prefix(key_prefix.as_str()))
                else {
                    continue;
                };
                entries.push(ObjectEntry::folder(folder.trim_end_matches('/')));
            }

            for object in page.contents() {
                let Some(name) = object
                    .key()
                    .and_then(|key| key.strip_prefix(key_prefix.as_str()))
                    .filter(|name| !name.is_empty())
                else {
                    // Zero-byte "directory marker" objects
                    continue;
                };

                entries.push(ObjectEntry {
                    name: name.to_string(),
                    id: None,
                    metadata: Some(json!({
                        "size": object.size(),
                        "eTag": object.e_tag(),
                        "lastModified": object
                            .last_modified()
                            .and_then(|at| at.fmt(DateTimeFormat::DateTime).ok()),
                    })),
                });
            }
        }

        debug!("S3 prefix {key_prefix} holds {} entries", entries.len());
        Ok(paginate(entries, options))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        let mut url = self.public_base_url.clone();
        // Checked in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(bucket)
                .extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        url.to_string()
    }
}
