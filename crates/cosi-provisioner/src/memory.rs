//! In-memory object-store backend
//!
//! Keeps containers in a set keyed by `"{account}/{container}"`. Used for
//! local runs of the driver and for tests; it counts backend calls and can be
//! told to fail the next create or delete.

use crate::backend::ObjectStoreBackend;
use crate::error::BackendError;
use crate::parameters::BucketParameters;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    containers: Mutex<BTreeSet<String>>,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    next_create_error: Mutex<Option<BackendError>>,
    next_delete_error: Mutex<Option<BackendError>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `create_bucket` calls received, including failed ones
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of `delete_bucket` calls received, including failed ones
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn contains(&self, bucket_id: &str) -> bool {
        self.containers.lock().contains(bucket_id)
    }

    pub fn container_count(&self) -> usize {
        self.containers.lock().len()
    }

    /// Make the next `create_bucket` call fail with `error`
    pub fn fail_next_create(&self, error: BackendError) {
        *self.next_create_error.lock() = Some(error);
    }

    /// Make the next `delete_bucket` call fail with `error`
    pub fn fail_next_delete(&self, error: BackendError) {
        *self.next_delete_error.lock() = Some(error);
    }
}

#[async_trait]
impl ObjectStoreBackend for InMemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create_bucket(
        &self,
        storage_account: &str,
        container: &str,
        _parameters: &BucketParameters,
    ) -> Result<String, BackendError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.next_create_error.lock().take() {
            return Err(error);
        }

        if storage_account.is_empty() {
            return Err(BackendError::InvalidParameters(
                "storage account is empty".to_string(),
            ));
        }

        let bucket_id = format!("{}/{}", storage_account, container);
        if !self.containers.lock().insert(bucket_id.clone()) {
            tracing::debug!(%bucket_id, "Container already exists");
        }
        Ok(bucket_id)
    }

    async fn delete_bucket(&self, bucket_id: &str) -> Result<(), BackendError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.next_delete_error.lock().take() {
            return Err(error);
        }

        if self.containers.lock().remove(bucket_id) {
            Ok(())
        } else {
            Err(BackendError::NotFound(bucket_id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let backend = InMemoryBackend::new();
        let params = BucketParameters::new();

        let first = backend.create_bucket("acct1", "logs", &params).await.unwrap();
        let second = backend.create_bucket("acct1", "logs", &params).await.unwrap();

        assert_eq!(first, "acct1/logs");
        assert_eq!(first, second);
        assert_eq!(backend.container_count(), 1);
        assert_eq!(backend.create_calls(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let backend = InMemoryBackend::new();

        let err = backend.delete_bucket("acct1/logs").await.unwrap_err();
        assert_eq!(err, BackendError::NotFound("acct1/logs".to_string()));
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let backend = InMemoryBackend::new();
        let params = BucketParameters::new();
        backend.fail_next_create(BackendError::Api("boom".to_string()));

        assert!(backend.create_bucket("acct1", "logs", &params).await.is_err());
        assert!(backend.create_bucket("acct1", "logs", &params).await.is_ok());
    }
}
