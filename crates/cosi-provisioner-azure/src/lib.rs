//! Azure Blob Storage backend for blob-cosi
//!
//! Implements [`ObjectStoreBackend`](cosi_provisioner::ObjectStoreBackend)
//! on top of Azure Blob Storage. A bucket maps to a blob container; the
//! storage account named in the request is created on demand.
//!
//! # Flow
//!
//! Create:
//! 1. Read storage account options from the bucket parameters
//! 2. Ensure the storage account exists (ARM, waits for provisioning)
//! 3. Fetch the account key (ARM `listKeys`)
//! 4. Create the container with the parameters as metadata (Shared Key)
//!
//! Delete parses the account and container back out of the bucket ID, which
//! is the container URL.
//!
//! # Requirements
//!
//! A service principal with rights on the resource group:
//! `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`,
//! `AZURE_SUBSCRIPTION_ID`, `AZURE_RESOURCE_GROUP`, either from the
//! environment or from the `azure` block of `cosi.kdl`.
//!
//! # Example
//!
//! ```ignore
//! use cosi_provisioner::BucketProvisioner;
//! use cosi_provisioner_azure::{AzureBlobBackend, AzureConfig};
//! use std::sync::Arc;
//!
//! let backend = AzureBlobBackend::new(AzureConfig::from_env()?)?;
//! let provisioner = BucketProvisioner::new(Arc::new(backend));
//! ```

pub mod arm;
pub mod backend;
pub mod blob;
pub mod config;
pub mod container;
pub mod error;
pub mod options;
pub mod shared_key;

pub use arm::{ArmClient, StorageAccount};
pub use backend::AzureBlobBackend;
pub use blob::{BlobClient, ContainerCreation};
pub use config::AzureConfig;
pub use container::{ContainerUrl, validate_account_name, validate_container_name};
pub use error::{AzureError, Result};
pub use options::StorageAccountOptions;
pub use shared_key::SharedKeyCredential;
