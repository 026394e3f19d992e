//! Object-store backend trait definition

use crate::error::BackendError;
use crate::parameters::BucketParameters;
use async_trait::async_trait;
use std::time::Duration;

/// Object-store backend abstraction
///
/// A backend performs the actual create/delete of a storage container. The
/// provisioner calls it only when a new effect is required and never while
/// holding the registry lock.
#[async_trait]
pub trait ObjectStoreBackend: Send + Sync {
    /// Returns the backend name (e.g., "azure-blob", "memory")
    fn name(&self) -> &str;

    /// Create `container` inside `storage_account` and return its bucket ID.
    ///
    /// Must be safe to call more than once for the same container: when the
    /// container already exists the call succeeds and returns the existing
    /// container's ID.
    async fn create_bucket(
        &self,
        storage_account: &str,
        container: &str,
        parameters: &BucketParameters,
    ) -> Result<String, BackendError>;

    /// Delete the container identified by `bucket_id`
    async fn delete_bucket(&self, bucket_id: &str) -> Result<(), BackendError>;
}

/// Retry configuration for backend polling
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_attempts: u32,

    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Delay before the given attempt (0-based), capped at `max_delay`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let secs = (self.initial_delay.as_secs_f64() * factor).min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(secs).unwrap_or(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}
