//! Exercises `SupabaseStorage` against a local stand-in for the storage API

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use object_storage::{
    BucketOptions, ListOptions, SortBy, StorageClient, StorageError, SupabaseStorage,
    UploadOptions,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;

const API_KEY: &str = "service-role-key";

#[derive(Clone, Default)]
struct Recorded {
    requests: Arc<Mutex<Vec<Value>>>,
}

impl Recorded {
    fn push(&self, value: Value) {
        self.requests.lock().unwrap().push(value);
    }

    fn all(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
    header("apikey").as_deref() == Some(API_KEY)
        && header("authorization") == Some(format!("Bearer {API_KEY}"))
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "statusCode": "401", "error": "Unauthorized", "message": "Invalid JWT" })),
    )
}

async fn list_buckets(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!([
            { "id": "photos", "name": "photos", "public": true, "owner": "" },
            { "id": "private", "name": "private", "public": false }
        ])),
    )
}

async fn create_bucket(
    State(recorded): State<Recorded>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    recorded.push(body.clone());
    if body["name"] == "taken" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "statusCode": "409",
                "error": "Duplicate",
                "message": "The resource already exists"
            })),
        );
    }
    (StatusCode::OK, Json(json!({ "name": body["name"] })))
}

async fn list_objects(
    State(recorded): State<Recorded>,
    Path(bucket): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    recorded.push(json!({ "bucket": bucket, "body": body }));
    if bucket == "missing" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "statusCode": "404", "error": "Bucket not found", "message": "Bucket not found" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!([
            { "name": "a.png", "id": "1", "metadata": { "size": 3 } },
            { "name": "thumbs", "id": null, "metadata": null }
        ])),
    )
}

async fn upload_object(
    State(recorded): State<Recorded>,
    Path((bucket, path)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    recorded.push(json!({
        "bucket": bucket,
        "path": path,
        "cache_control": header("cache-control"),
        "upsert": header("x-upsert"),
        "content_type": header("content-type"),
        "body": String::from_utf8_lossy(&body),
    }));
    (StatusCode::OK, Json(json!({ "Key": format!("{bucket}/{path}") })))
}

async fn spawn_storage_api() -> (String, Recorded) {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/storage/v1/bucket", get(list_buckets).post(create_bucket))
        .route("/storage/v1/object/list/{bucket}", post(list_objects))
        .route("/storage/v1/object/{bucket}/{*path}", post(upload_object))
        .with_state(recorded.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}"), recorded)
}

#[tokio::test]
async fn test_list_buckets_sends_credentials() {
    let (url, _) = spawn_storage_api().await;

    let storage = SupabaseStorage::new(&url, API_KEY).unwrap();
    let buckets = storage.list_buckets().await.unwrap();
    let names: Vec<&str> = buckets.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["photos", "private"]);
    assert!(buckets[0].public);

    let anonymous = SupabaseStorage::new(&url, "wrong").unwrap();
    let error = anonymous.list_buckets().await.unwrap_err();
    assert!(matches!(error, StorageError::Api { status: 401, .. }));
    assert_eq!(error.to_string(), "Invalid JWT");
}

#[tokio::test]
async fn test_create_bucket_body_and_conflict() {
    let (url, recorded) = spawn_storage_api().await;
    let storage = SupabaseStorage::new(&url, API_KEY).unwrap();

    storage
        .create_bucket("photos", BucketOptions { public: true })
        .await
        .unwrap();
    let error = storage
        .create_bucket("taken", BucketOptions { public: true })
        .await
        .unwrap_err();
    assert!(matches!(error, StorageError::AlreadyExists(ref name) if name == "taken"));
    assert_eq!(error.to_string(), "The resource already exists: taken");

    assert_eq!(
        recorded.all()[0],
        json!({ "id": "photos", "name": "photos", "public": true })
    );
}

#[tokio::test]
async fn test_list_sends_pagination_window() {
    let (url, recorded) = spawn_storage_api().await;
    let storage = SupabaseStorage::new(&url, API_KEY).unwrap();

    let options = ListOptions {
        limit: 100,
        offset: 200,
        sort_by: SortBy::name_ascending(),
    };
    let entries = storage.list("photos", "uploads", &options).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id.as_deref(), Some("1"));
    assert!(entries[1].id.is_none() && entries[1].metadata.is_none());

    assert_eq!(
        recorded.all()[0],
        json!({
            "bucket": "photos",
            "body": {
                "prefix": "uploads",
                "limit": 100,
                "offset": 200,
                "sortBy": { "column": "name", "order": "asc" }
            }
        })
    );

    let error = storage.list("missing", "uploads", &options).await.unwrap_err();
    assert!(matches!(error, StorageError::BucketNotFound(ref name) if name == "missing"));
}

#[tokio::test]
async fn test_upload_sends_object_options_as_headers() {
    let (url, recorded) = spawn_storage_api().await;
    let storage = SupabaseStorage::new(&url, API_KEY).unwrap();

    let options = UploadOptions {
        content_type: "image/png".to_string(),
        ..UploadOptions::default()
    };
    storage
        .upload(
            "photos",
            "uploads/1700000000000-cat.png",
            Bytes::from_static(b"png"),
            &options,
        )
        .await
        .unwrap();

    assert_eq!(
        recorded.all()[0],
        json!({
            "bucket": "photos",
            "path": "uploads/1700000000000-cat.png",
            "cache_control": "max-age=3600",
            "upsert": "false",
            "content_type": "image/png",
            "body": "png",
        })
    );
}
