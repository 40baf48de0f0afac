//! Storage service implementation using Apache OpenDAL.

use opendal::{ErrorKind, Operator, services};
use uuid::Uuid;
use ziklo_shared::types::ClosureId;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Storage service for rendered export artifacts.
#[derive(Debug, Clone)]
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// In-memory storage with default limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory backend cannot be initialized.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::from_config(StorageConfig::new(StorageProvider::Memory))
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish()
                .pipe(Ok),
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
        }
    }

    /// Storage key for one export attempt of a closure revision.
    ///
    /// Format: `exports/{closure_id}/r{revision:04}-{attempt}.{extension}`
    ///
    /// Writers racing on the same revision never share a key, so a losing
    /// writer only ever deletes its own object.
    #[must_use]
    pub fn export_key(
        closure_id: ClosureId,
        revision: i32,
        attempt: Uuid,
        extension: &str,
    ) -> String {
        format!(
            "exports/{closure_id}/r{revision:04}-{}.{}",
            attempt.simple(),
            sanitize_segment(extension)
        )
    }

    /// Write an artifact, replacing any object under the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact is too large or the write fails.
    pub async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if size > self.config.max_artifact_size {
            return Err(StorageError::artifact_too_large(
                size,
                self.config.max_artifact_size,
            ));
        }

        self.operator
            .write(key, bytes)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    /// Read an artifact.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the key does not exist.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        match self.operator.read(key).await {
            Ok(buffer) => Ok(buffer.to_vec()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::not_found(key)),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    /// Delete an artifact. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if an artifact exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        self.operator.stat(key).await.is_ok()
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("csv"), "csv");
        assert_eq!(sanitize_segment("../csv"), ".._csv");
        assert_eq!(sanitize_segment("x l s"), "x_l_s");
    }

    #[test]
    fn test_export_key_format() {
        let id = ClosureId::from_uuid(
            Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").expect("valid uuid"),
        );
        let attempt = Uuid::from_u128(0x0191_e0a8_7c4e_7cc1_8a5e_3c7f_2b6d_9e10);
        assert_eq!(
            StorageService::export_key(id, 3, attempt, "csv"),
            "exports/550e8400-e29b-41d4-a716-446655440000/r0003-0191e0a87c4e7cc18a5e3c7f2b6d9e10.csv"
        );
    }

    #[test]
    fn test_export_key_differs_per_attempt() {
        let id = ClosureId::new();
        let first = StorageService::export_key(id, 2, Uuid::now_v7(), "csv");
        let second = StorageService::export_key(id, 2, Uuid::now_v7(), "csv");
        assert_ne!(first, second);
        assert!(first.starts_with(&format!("exports/{id}/r0002-")));
    }

    #[tokio::test]
    async fn test_memory_write_read_delete() {
        let storage = StorageService::in_memory().expect("memory storage");
        let key = "exports/a/r0001.csv";

        storage.write(key, b"date,hours\n".to_vec()).await.expect("write");
        assert!(storage.exists(key).await);
        assert_eq!(storage.read(key).await.expect("read"), b"date,hours\n");

        storage.delete(key).await.expect("delete");
        assert!(!storage.exists(key).await);
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let storage = StorageService::in_memory().expect("memory storage");
        let err = storage.read("exports/missing.csv").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_write_rejects_oversized_artifact() {
        let config = StorageConfig::new(StorageProvider::Memory).with_max_artifact_size(4);
        let storage = StorageService::from_config(config).expect("memory storage");
        let err = storage.write("big.csv", vec![0; 8]).await.unwrap_err();
        assert!(matches!(err, StorageError::ArtifactTooLarge { size: 8, max: 4 }));
    }

    #[test]
    fn test_provider_name() {
        let storage = StorageService::in_memory().expect("memory storage");
        assert_eq!(storage.provider_name(), "memory");
        assert_eq!(storage.bucket(), "memory");
    }
}
