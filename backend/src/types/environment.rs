//! Environment configuration for different deployment stages

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use aws_sdk_s3::Client as S3Client;
use object_storage::{
    InMemoryStorage, S3Storage, StorageClient, StorageError, SupabaseStorage,
};
use tracing::Level;

use crate::gallery::GallerySettings;

/// Storage service the gallery is backed by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Supabase Storage REST API
    Supabase,
    /// S3-compatible object storage
    S3,
    /// In-process storage, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "supabase" => Ok(Self::Supabase),
            "s3" => Ok(Self::S3),
            "memory" => Ok(Self::Memory),
            other => Err(format!("Invalid storage backend: {other}")),
        }
    }
}

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (local Supabase stack or `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Storage service selected with `STORAGE_BACKEND`, Supabase by default
    ///
    /// # Panics
    ///
    /// Panics if `STORAGE_BACKEND` names an unknown backend
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn storage_backend(&self) -> StorageBackend {
        env::var("STORAGE_BACKEND").map_or(StorageBackend::Supabase, |value| {
            value.parse().unwrap_or_else(|e: String| panic!("{e}"))
        })
    }

    /// Base URL of the Supabase project
    ///
    /// # Panics
    ///
    /// Panics if the `SUPABASE_URL` environment variable is not set outside development
    #[must_use]
    pub fn supabase_url(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("SUPABASE_URL").expect("SUPABASE_URL environment variable is not set")
            }
            Self::Development => {
                env::var("SUPABASE_URL").unwrap_or_else(|_| "http://localhost:54321".to_string())
            }
        }
    }

    /// Supabase key the storage API is called with
    ///
    /// # Panics
    ///
    /// Panics if the `SUPABASE_SERVICE_ROLE_KEY` environment variable is not
    /// set outside development
    #[must_use]
    pub fn supabase_key(&self) -> String {
        match self {
            Self::Production | Self::Staging => env::var("SUPABASE_SERVICE_ROLE_KEY")
                .expect("SUPABASE_SERVICE_ROLE_KEY environment variable is not set"),
            Self::Development => env::var("SUPABASE_SERVICE_ROLE_KEY").unwrap_or_default(),
        }
    }

    /// Base URL S3 objects are publicly readable from
    ///
    /// # Panics
    ///
    /// Panics if the `S3_PUBLIC_URL` environment variable is not set outside development
    #[must_use]
    pub fn s3_public_url(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("S3_PUBLIC_URL").expect("S3_PUBLIC_URL environment variable is not set")
            }
            Self::Development => env::var("S3_PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:4566".to_string()),
        }
    }

    /// Storage dashboard linked next to a loaded bucket
    #[must_use]
    pub fn studio_url(&self) -> Option<String> {
        match self {
            Self::Production | Self::Staging => env::var("STUDIO_URL").ok(),
            Self::Development => Some(env::var("STUDIO_URL").unwrap_or_else(|_| {
                "http://localhost:54323/project/default/storage/buckets".to_string()
            })),
        }
    }

    /// Gallery tunables for this environment
    #[must_use]
    pub fn gallery_settings(&self) -> GallerySettings {
        GallerySettings {
            studio_url: self.studio_url(),
            ..GallerySettings::default()
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Port the HTTP server listens on, `PORT` or 8001
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number
    #[allow(clippy::unused_self)]
    pub fn port(&self) -> Result<u16, std::num::ParseIntError> {
        env::var("PORT").map_or(Ok(8001), |p| p.parse())
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Builds the storage client selected by [`Self::storage_backend`]
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` if the Supabase URL or the S3
    /// public URL is invalid
    pub async fn storage_client(&self) -> Result<Arc<dyn StorageClient>, StorageError> {
        let storage: Arc<dyn StorageClient> = match self.storage_backend() {
            StorageBackend::Supabase => Arc::new(SupabaseStorage::new(
                &self.supabase_url(),
                self.supabase_key(),
            )?),
            StorageBackend::S3 => {
                let s3_client = Arc::new(S3Client::from_conf(self.s3_client_config().await));
                Arc::new(S3Storage::new(s3_client, &self.s3_public_url())?)
            }
            StorageBackend::Memory => Arc::new(InMemoryStorage::new()),
        };

        Ok(storage)
    }

    /// Default log level, overridable with `TRACING_LEVEL`
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}
