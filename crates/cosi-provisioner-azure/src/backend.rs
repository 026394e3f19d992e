//! ObjectStoreBackend implementation for Azure Blob Storage

use crate::arm::ArmClient;
use crate::blob::{BlobClient, ContainerCreation};
use crate::config::AzureConfig;
use crate::container::{ContainerUrl, validate_account_name, validate_container_name};
use crate::error::Result;
use crate::options::StorageAccountOptions;
use crate::shared_key::SharedKeyCredential;
use async_trait::async_trait;
use cosi_provisioner::{BackendError, BucketParameters, ObjectStoreBackend, RetryConfig};
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Azure Blob Storage backend
///
/// Storage accounts are managed through ARM; containers through the Blob
/// service using the account's Shared Key.
pub struct AzureBlobBackend {
    arm: ArmClient,
    blob: BlobClient,
}

impl AzureBlobBackend {
    pub fn new(config: AzureConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("blob-cosi/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            blob: BlobClient::new(client.clone(), config.storage_suffix.clone()),
            arm: ArmClient::new(client, config),
        })
    }

    /// Override the storage account provisioning poll
    pub fn with_provisioning_retry(mut self, retry: RetryConfig) -> Self {
        self.arm = self.arm.with_provisioning_retry(retry);
        self
    }

    async fn credential(&self, account: &str) -> Result<SharedKeyCredential> {
        let key = self.arm.list_keys(account).await?;
        SharedKeyCredential::new(account, &key)
    }

    #[tracing::instrument(skip(self, parameters))]
    async fn create(
        &self,
        account: &str,
        container: &str,
        parameters: &BucketParameters,
    ) -> Result<String> {
        validate_account_name(account)?;
        validate_container_name(container)?;
        let options = StorageAccountOptions::from_parameters(parameters)?;

        self.arm.ensure_storage_account(account, &options).await?;
        let credential = self.credential(account).await?;

        let (url, outcome) = self
            .blob
            .create_container(&credential, container, parameters)
            .await?;
        if outcome == ContainerCreation::Created {
            tracing::info!(bucket_id = %url, "Container created");
        }

        Ok(url.to_string())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, bucket_id: &str) -> Result<()> {
        let url = ContainerUrl::parse(bucket_id)?;
        let credential = self.credential(&url.account).await?;

        self.blob.delete_container(&credential, &url).await?;
        tracing::info!("Container deleted");
        Ok(())
    }
}

#[async_trait]
impl ObjectStoreBackend for AzureBlobBackend {
    fn name(&self) -> &str {
        "azure-blob"
    }

    async fn create_bucket(
        &self,
        storage_account: &str,
        container: &str,
        parameters: &BucketParameters,
    ) -> std::result::Result<String, BackendError> {
        self.create(storage_account, container, parameters)
            .await
            .map_err(BackendError::from)
    }

    async fn delete_bucket(&self, bucket_id: &str) -> std::result::Result<(), BackendError> {
        self.delete(bucket_id).await.map_err(BackendError::from)
    }
}
