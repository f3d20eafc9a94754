pub mod buckets;
pub mod config;
pub mod gallery;
pub mod uploads;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

/// Creates the v1 API router with all v1 handler routes
#[must_use]
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/buckets",
            get(buckets::list_buckets).post(buckets::create_bucket),
        )
        .api_route("/buckets/{bucket}/uploads", post(uploads::upload_files))
        .api_route("/buckets/{bucket}/gallery", get(gallery::load_gallery))
        .api_route("/config", get(config::get_config))
}
