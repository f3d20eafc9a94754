//! Supabase Storage REST client
//!
//! Talks to the endpoints under `<project>/storage/v1`. Requests authenticate
//! with the project key sent both as `apikey` and as a bearer token.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    header::{CACHE_CONTROL, CONTENT_TYPE},
    Client, RequestBuilder, Response, StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{
    Bucket, BucketOptions, ListOptions, ObjectEntry, StorageClient, StorageError, StorageResult,
    UploadOptions,
};

/// Error body returned by the storage API, `{statusCode, error, message}`
///
/// The HTTP status is often a plain 400; `statusCode` carries the real one.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default, rename = "statusCode")]
    status_code: Option<ReportedStatus>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// `statusCode` is sent as a string by most endpoints and as a number by some
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReportedStatus {
    Text(String),
    Number(u64),
}

impl ReportedStatus {
    fn as_u16(&self) -> Option<u16> {
        match self {
            Self::Text(code) => code.trim().parse().ok(),
            Self::Number(code) => u16::try_from(*code).ok(),
        }
    }
}

/// What a request was about, used to name the resource in errors
#[derive(Debug, Clone, Copy)]
struct Subject<'a> {
    bucket: &'a str,
    path: Option<&'a str>,
}

impl<'a> Subject<'a> {
    const fn bucket(bucket: &'a str) -> Self {
        Self { bucket, path: None }
    }

    const fn object(bucket: &'a str, path: &'a str) -> Self {
        Self {
            bucket,
            path: Some(path),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateBucketBody<'a> {
    id: &'a str,
    name: &'a str,
    public: bool,
}

#[derive(Debug, Serialize)]
struct ListBody<'a> {
    prefix: &'a str,
    #[serde(flatten)]
    options: &'a ListOptions,
}

/// Storage client backed by the Supabase Storage API
pub struct SupabaseStorage {
    http: Client,
    storage_url: Url,
    api_key: String,
}

impl SupabaseStorage {
    /// Creates a client for the project at `project_url`
    ///
    /// # Arguments
    ///
    /// * `project_url` - Base URL of the Supabase project, e.g. `http://localhost:54321`
    /// * `api_key` - Project key used for authentication
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` if the URL cannot be parsed or is
    /// not a hierarchical HTTP URL
    pub fn new(project_url: &str, api_key: impl Into<String>) -> StorageResult<Self> {
        Self::with_client(Client::new(), project_url, api_key)
    }

    /// Creates a client reusing an existing `reqwest::Client`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` if the URL is invalid
    pub fn with_client(
        http: Client,
        project_url: &str,
        api_key: impl Into<String>,
    ) -> StorageResult<Self> {
        let mut storage_url = Url::parse(project_url).map_err(|e| {
            StorageError::ConfigError(format!("Invalid Supabase URL {project_url}: {e}"))
        })?;

        if storage_url.cannot_be_a_base() {
            return Err(StorageError::ConfigError(format!(
                "Supabase URL must be an http(s) URL: {project_url}"
            )));
        }

        extend_path(&mut storage_url, &["storage", "v1"]);

        Ok(Self {
            http,
            storage_url,
            api_key: api_key.into(),
        })
    }

    /// Builds an endpoint URL from path segments, splitting object paths on `/`
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.storage_url.clone();
        let split: Vec<&str> = segments
            .iter()
            .flat_map(|segment| segment.split('/'))
            .filter(|segment| !segment.is_empty())
            .collect();
        extend_path(&mut url, &split);
        url
    }

    /// Sends an authenticated request, turning error statuses into `StorageError`
    async fn send(&self, request: RequestBuilder, subject: Subject<'_>) -> StorageResult<Response> {
        let response = request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body, subject))
    }
}

fn extend_path(url: &mut Url, segments: &[&str]) {
    // Only fails for cannot-be-a-base URLs, which `with_client` rejects
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
}

/// Converts a non-success response into a storage error
///
/// A reported 409 becomes `AlreadyExists` and a reported 404 `BucketNotFound`.
fn api_error(status: StatusCode, body: &str, subject: Subject<'_>) -> StorageError {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
    let reported = parsed
        .as_ref()
        .and_then(|body| body.status_code.as_ref())
        .and_then(ReportedStatus::as_u16)
        .unwrap_or(status.as_u16());

    match reported {
        409 => {
            let name = subject.path.unwrap_or(subject.bucket);
            return StorageError::AlreadyExists(name.to_string());
        }
        404 => return StorageError::BucketNotFound(subject.bucket.to_string()),
        _ => {}
    }

    let message = parsed
        .and_then(|body| body.message.or(body.error))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown storage error")
                .to_string()
        });

    if status.is_server_error() {
        warn!("Supabase storage upstream error {status}: {message}");
    }

    StorageError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl StorageClient for SupabaseStorage {
    #[instrument(skip(self))]
    async fn list_buckets(&self) -> StorageResult<Vec<Bucket>> {
        let url = self.endpoint(&["bucket"]);
        let response = self.send(self.http.get(url), Subject::bucket("")).await?;
        let buckets: Vec<Bucket> = response.json().await?;

        debug!("Listed {} buckets", buckets.len());
        Ok(buckets)
    }

    #[instrument(skip(self))]
    async fn create_bucket(&self, name: &str, options: BucketOptions) -> StorageResult<()> {
        let url = self.endpoint(&["bucket"]);
        let body = CreateBucketBody {
            id: name,
            name,
            public: options.public,
        };

        self.send(self.http.post(url).json(&body), Subject::bucket(name))
            .await?;
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
        let url = self.endpoint(&["object", bucket, path]);
        let request = self
            .http
            .post(url)
            .header(CACHE_CONTROL, format!("max-age={}", options.cache_control))
            .header("x-upsert", options.upsert.to_string())
            .header(CONTENT_TYPE, &options.content_type)
            .body(content);

        self.send(request, Subject::object(bucket, path)).await?;
        Ok(())
    }

    #[instrument(skip(self, options), fields(offset = options.offset, limit = options.limit))]
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: &ListOptions,
    ) -> StorageResult<Vec<ObjectEntry>> {
        let url = self.endpoint(&["object", "list", bucket]);
        let body = ListBody { prefix, options };

        let response = self
            .send(self.http.post(url).json(&body), Subject::bucket(bucket))
            .await?;
        let entries: Vec<ObjectEntry> = response.json().await?;
        Ok(entries)
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.endpoint(&["object", "public", bucket, path]).to_string()
    }
}
