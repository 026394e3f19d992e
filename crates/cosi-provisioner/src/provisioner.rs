//! Bucket provisioner
//!
//! Arbitrates create/delete requests against the [`Registry`] and calls the
//! [`ObjectStoreBackend`] exactly when a new effect is required.

use crate::backend::ObjectStoreBackend;
use crate::error::{ProvisionError, Result};
use crate::parameters::BucketParameters;
use crate::registry::{BucketRecord, Registration, Registry};
use crate::request::{
    BucketAccess, CreateBucketRequest, GrantBucketAccessRequest, RevokeBucketAccessRequest,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Bucket provisioning state manager
pub struct BucketProvisioner {
    backend: Arc<dyn ObjectStoreBackend>,
    registry: Arc<Registry>,
}

impl BucketProvisioner {
    /// Create a provisioner with a fresh, empty registry
    pub fn new(backend: Arc<dyn ObjectStoreBackend>) -> Self {
        Self::with_registry(backend, Arc::new(Registry::new()))
    }

    pub fn with_registry(backend: Arc<dyn ObjectStoreBackend>, registry: Arc<Registry>) -> Self {
        Self { backend, registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Create a bucket, or return the existing ID for a repeated request.
    ///
    /// - name registered with equal parameters: stored ID, no backend call
    /// - name registered with other parameters: `AlreadyExists`
    /// - otherwise: backend create, then registration
    #[instrument(skip(self, request), fields(bucket = %request.name, backend = self.backend.name()))]
    pub async fn create_bucket(&self, request: CreateBucketRequest) -> Result<String> {
        let CreateBucketRequest {
            name,
            protocol,
            parameters,
        } = request;

        let protocol = protocol
            .ok_or_else(|| ProvisionError::InvalidArgument("protocol is missing".to_string()))?;
        let storage_account = protocol.azure_storage_account().ok_or_else(|| {
            ProvisionError::InvalidArgument("azure blob protocol is missing".to_string())
        })?;
        if name.is_empty() {
            return Err(ProvisionError::InvalidArgument(
                "bucket name is empty".to_string(),
            ));
        }

        if let Some(existing) = self.registry.lookup(&name) {
            debug!(bucket_id = %existing.bucket_id, "Bucket already registered");
            return resolve_existing(existing, &parameters);
        }

        debug!(storage_account, "Creating bucket in backend");
        let bucket_id = self
            .backend
            .create_bucket(storage_account, &name, &parameters)
            .await
            .inspect_err(|e| warn!(error = %e, "Backend create failed"))?;

        let requested = parameters.clone();
        match self
            .registry
            .register(BucketRecord::new(name, bucket_id, parameters))
        {
            Registration::Inserted(record) => {
                info!(bucket_id = %record.bucket_id, "Bucket created");
                Ok(record.bucket_id)
            }
            Registration::Existing(existing) => {
                debug!(
                    bucket_id = %existing.bucket_id,
                    "Bucket registered concurrently by another request"
                );
                resolve_existing(existing, &requested)
            }
        }
    }

    /// Delete a bucket by ID.
    ///
    /// IDs unknown to the registry are still forwarded to the backend. The
    /// registry entry is removed only after the backend delete succeeds.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn delete_bucket(&self, bucket_id: &str) -> Result<()> {
        if bucket_id.is_empty() {
            return Err(ProvisionError::InvalidArgument(
                "bucket id is empty".to_string(),
            ));
        }

        match self.registry.name_for(bucket_id) {
            Some(name) => debug!(bucket = %name, "Deleting registered bucket"),
            None => debug!("Bucket not registered, forwarding delete to backend"),
        }

        self.backend
            .delete_bucket(bucket_id)
            .await
            .inspect_err(|e| warn!(error = %e, "Backend delete failed"))?;

        if let Some(record) = self.registry.remove_by_id(bucket_id) {
            info!(bucket = %record.name, "Bucket deleted");
        } else {
            info!("Bucket deleted (not registered)");
        }
        Ok(())
    }

    /// Access control is not modeled; always succeeds with empty credentials
    pub async fn grant_bucket_access(
        &self,
        request: GrantBucketAccessRequest,
    ) -> Result<BucketAccess> {
        debug!(
            bucket_id = %request.bucket_id,
            account = %request.account_name,
            "Grant bucket access (no-op)"
        );
        Ok(BucketAccess::default())
    }

    /// Access control is not modeled; always succeeds
    pub async fn revoke_bucket_access(&self, request: RevokeBucketAccessRequest) -> Result<()> {
        debug!(
            bucket_id = %request.bucket_id,
            account_id = %request.account_id,
            "Revoke bucket access (no-op)"
        );
        Ok(())
    }
}

fn resolve_existing(existing: BucketRecord, requested: &BucketParameters) -> Result<String> {
    if existing.parameters == *requested {
        Ok(existing.bucket_id)
    } else {
        Err(ProvisionError::AlreadyExists(existing.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;
    use crate::request::Protocol;
    use crate::{BackendError, BucketParameters};

    fn provisioner() -> (BucketProvisioner, Arc<InMemoryBackend>) {
        let backend = Arc::new(InMemoryBackend::new());
        (BucketProvisioner::new(backend.clone()), backend)
    }

    fn tier(value: &str) -> BucketParameters {
        [("tier", value)].into_iter().collect()
    }

    #[tokio::test]
    async fn test_missing_protocol_is_invalid() {
        let (prov, backend) = provisioner();

        let err = prov
            .create_bucket(CreateBucketRequest::new("logs"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::InvalidArgument(_)));
        assert_eq!(backend.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_non_azure_protocol_is_invalid() {
        let (prov, _) = provisioner();

        let err = prov
            .create_bucket(CreateBucketRequest::new("logs").with_protocol(Protocol::S3 {
                region: "us-east-1".to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ProvisionError::InvalidArgument("azure blob protocol is missing".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_name_is_invalid() {
        let (prov, backend) = provisioner();

        let err = prov
            .create_bucket(CreateBucketRequest::new("").with_azure_blob("acct1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::InvalidArgument(_)));
        assert_eq!(backend.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_repeated_create_hits_registry() {
        let (prov, backend) = provisioner();
        let request = CreateBucketRequest::new("logs")
            .with_azure_blob("acct1")
            .with_parameters(tier("hot"));

        let first = prov.create_bucket(request.clone()).await.unwrap();
        let second = prov.create_bucket(request).await.unwrap();

        assert_eq!(first, "acct1/logs");
        assert_eq!(first, second);
        assert_eq!(backend.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_conflicting_create_rejected() {
        let (prov, backend) = provisioner();
        prov.create_bucket(
            CreateBucketRequest::new("logs")
                .with_azure_blob("acct1")
                .with_parameters(tier("hot")),
        )
        .await
        .unwrap();

        let err = prov
            .create_bucket(
                CreateBucketRequest::new("logs")
                    .with_azure_blob("acct1")
                    .with_parameters(tier("cold")),
            )
            .await
            .unwrap_err();

        assert_eq!(err, ProvisionError::AlreadyExists("logs".to_string()));
        assert_eq!(prov.registry().lookup("logs").unwrap().parameters, tier("hot"));
        assert_eq!(backend.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_backend_create_failure_registers_nothing() {
        let (prov, backend) = provisioner();
        backend.fail_next_create(BackendError::Api("quota exceeded".to_string()));

        let err = prov
            .create_bucket(CreateBucketRequest::new("logs").with_azure_blob("acct1"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ProvisionError::Backend(BackendError::Api("quota exceeded".to_string()))
        );
        assert!(prov.registry().is_empty());

        // retry goes back to the backend
        let id = prov
            .create_bucket(CreateBucketRequest::new("logs").with_azure_blob("acct1"))
            .await
            .unwrap();
        assert_eq!(id, "acct1/logs");
        assert_eq!(backend.create_calls(), 2);
    }

    #[tokio::test]
    async fn test_delete_removes_mapping() {
        let (prov, backend) = provisioner();
        let request = CreateBucketRequest::new("logs").with_azure_blob("acct1");

        let id = prov.create_bucket(request.clone()).await.unwrap();
        prov.delete_bucket(&id).await.unwrap();

        assert!(prov.registry().is_empty());
        prov.create_bucket(request).await.unwrap();
        assert_eq!(backend.create_calls(), 2);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_record() {
        let (prov, backend) = provisioner();
        let id = prov
            .create_bucket(CreateBucketRequest::new("logs").with_azure_blob("acct1"))
            .await
            .unwrap();

        backend.fail_next_delete(BackendError::Transport("connection reset".to_string()));
        let err = prov.delete_bucket(&id).await.unwrap_err();

        assert!(matches!(err, ProvisionError::Backend(BackendError::Transport(_))));
        assert!(prov.registry().lookup("logs").is_some());
        assert!(prov.registry().is_consistent());
    }

    #[tokio::test]
    async fn test_delete_unregistered_forwards_to_backend() {
        let backend = Arc::new(InMemoryBackend::new());
        backend
            .create_bucket("acct1", "orphan", &BucketParameters::new())
            .await
            .unwrap();
        let prov = BucketProvisioner::new(backend.clone());

        prov.delete_bucket("acct1/orphan").await.unwrap();

        assert_eq!(backend.delete_calls(), 1);
        assert!(!backend.contains("acct1/orphan"));
    }

    #[tokio::test]
    async fn test_delete_unknown_everywhere_reports_backend_error() {
        let (prov, _) = provisioner();

        let err = prov.delete_bucket("acct1/missing").await.unwrap_err();

        assert!(matches!(err, ProvisionError::Backend(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_bucket_id_is_invalid() {
        let (prov, backend) = provisioner();

        let err = prov.delete_bucket("").await.unwrap_err();

        assert!(matches!(err, ProvisionError::InvalidArgument(_)));
        assert_eq!(backend.delete_calls(), 0);
    }

    #[tokio::test]
    async fn test_access_operations_are_noops() {
        let (prov, _) = provisioner();

        let access = prov
            .grant_bucket_access(GrantBucketAccessRequest {
                bucket_id: "acct1/logs".to_string(),
                account_name: "reader".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(access, BucketAccess::default());

        prov.revoke_bucket_access(RevokeBucketAccessRequest::default())
            .await
            .unwrap();
        assert!(prov.registry().is_empty());
    }
}
