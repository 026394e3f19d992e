use async_trait::async_trait;
use cosi_provisioner::{BackendError, BucketParameters, InMemoryBackend, ObjectStoreBackend};
use std::sync::Arc;
use tokio::sync::Barrier;

/// Backend that holds every create call until `parties` calls have arrived,
/// so concurrent requests are guaranteed to overlap inside the backend.
pub struct GatedBackend {
    pub inner: Arc<InMemoryBackend>,
    gate: Barrier,
}

impl GatedBackend {
    pub fn new(parties: usize) -> Self {
        Self {
            inner: Arc::new(InMemoryBackend::new()),
            gate: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl ObjectStoreBackend for GatedBackend {
    fn name(&self) -> &str {
        "gated"
    }

    async fn create_bucket(
        &self,
        storage_account: &str,
        container: &str,
        parameters: &BucketParameters,
    ) -> Result<String, BackendError> {
        self.gate.wait().await;
        self.inner
            .create_bucket(storage_account, container, parameters)
            .await
    }

    async fn delete_bucket(&self, bucket_id: &str) -> Result<(), BackendError> {
        self.inner.delete_bucket(bucket_id).await
    }
}

pub fn params(pairs: &[(&str, &str)]) -> BucketParameters {
    pairs.iter().copied().collect()
}
