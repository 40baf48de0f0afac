//! Storage configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use ziklo_shared::StorageSettings;

/// Storage provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// In-process memory (default, tests)
    #[default]
    Memory,
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Create S3-compatible provider (Cloudflare R2, Supabase, AWS S3).
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name for logs and health output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }

    /// Get the bucket name, or the root for local storage.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::Memory => "memory",
            Self::S3 { bucket, .. } => bucket,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
        }
    }
}

impl From<&StorageSettings> for StorageProvider {
    fn from(settings: &StorageSettings) -> Self {
        match settings {
            StorageSettings::Memory => Self::Memory,
            StorageSettings::LocalFs { root } => Self::local_fs(root),
            StorageSettings::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => Self::s3(endpoint, bucket, access_key_id, secret_access_key, region),
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Maximum artifact size in bytes.
    pub max_artifact_size: u64,
}

impl StorageConfig {
    /// Default max artifact size: 50MB.
    pub const DEFAULT_MAX_ARTIFACT_SIZE: u64 = 50 * 1024 * 1024;

    /// Create a new storage config with defaults.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_artifact_size: Self::DEFAULT_MAX_ARTIFACT_SIZE,
        }
    }

    /// Set maximum artifact size.
    #[must_use]
    pub fn with_max_artifact_size(mut self, size: u64) -> Self {
        self.max_artifact_size = size;
        self
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(StorageProvider::default())
    }
}
