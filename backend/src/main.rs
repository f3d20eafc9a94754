use std::sync::Arc;

use backend::{gallery::GalleryController, server, types::Environment};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    // Configure logging format based on environment
    // Use JSON format for staging/production (Datadog), regular format for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt().json().with_env_filter(env_filter).init();
        }
        Environment::Development => {
            fmt().with_env_filter(env_filter).init();
        }
    }

    let storage = environment.storage_client().await?;
    tracing::info!(backend = ?environment.storage_backend(), "Storage client ready");

    let gallery = Arc::new(GalleryController::new(
        storage,
        environment.gallery_settings(),
    ));

    server::start(environment, gallery).await
}
