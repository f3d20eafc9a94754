use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use backend::{
    gallery::{GalleryController, GallerySettings},
    server,
    types::Environment,
};
use chrono::{DateTime, TimeZone, Utc};
use object_storage::InMemoryStorage;
use tower::ServiceExt;

use super::utils::MultipartBody;

/// Milliseconds every upload in the tests is stamped with
pub const FIXED_MILLIS: i64 = 1_700_000_000_000;

/// Dashboard page the tests configure
pub const STUDIO_URL: &str = "http://localhost:54323/project/default/storage/buckets";

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    // Load test environment variables
    dotenvy::from_path(".env.example").ok();

    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

fn fixed_clock() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(FIXED_MILLIS)
        .single()
        .expect("valid timestamp")
}

/// Router over an in-memory storage backend
pub struct TestSetup {
    pub router: Router,
    pub storage: Arc<InMemoryStorage>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_environment(Environment::Development)
    }

    pub fn with_environment(environment: Environment) -> Self {
        setup_test_env();

        let storage = Arc::new(InMemoryStorage::new());
        let settings = GallerySettings {
            studio_url: Some(STUDIO_URL.to_string()),
            ..GallerySettings::default()
        };
        let gallery =
            Arc::new(GalleryController::new(storage.clone(), settings).with_clock(fixed_clock));

        Self {
            router: server::router(environment, gallery),
            storage,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    pub async fn send_get_request(&self, route: &str) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())
            .expect("valid request");
        self.send(request).await
    }

    pub async fn send_post_request(&self, route: &str, payload: serde_json::Value) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("valid request");
        self.send(request).await
    }

    pub async fn send_form_request(&self, route: &str, form: &str) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("valid request");
        self.send(request).await
    }

    pub async fn send_multipart_request(&self, route: &str, form: MultipartBody) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", form.content_type())
            .body(Body::from(form.finish()))
            .expect("valid request");
        self.send(request).await
    }

    /// Creates `bucket` through the JSON API
    pub async fn create_bucket(&self, bucket: &str) {
        let response = self
            .send_post_request("/v1/buckets", serde_json::json!({ "name": bucket }))
            .await;
        assert_eq!(response.status(), http::StatusCode::OK);
    }
}
