//! Provisioning request types

use crate::parameters::BucketParameters;
use serde::{Deserialize, Serialize};

/// Storage protocol selected by a create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// Azure Blob Storage container inside a storage account
    AzureBlob { storage_account: String },
    /// S3-compatible bucket
    S3 { region: String },
    /// Google Cloud Storage bucket
    Gcs { project_id: String },
}

impl Protocol {
    /// The storage account reference, if this is an Azure Blob protocol
    pub fn azure_storage_account(&self) -> Option<&str> {
        match self {
            Protocol::AzureBlob { storage_account } => Some(storage_account),
            _ => None,
        }
    }
}

/// Request to create (or idempotently re-create) a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBucketRequest {
    /// Caller-assigned bucket name
    pub name: String,

    /// Protocol selector; required
    pub protocol: Option<Protocol>,

    /// Creation parameters
    pub parameters: BucketParameters,
}

impl CreateBucketRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            protocol: None,
            parameters: BucketParameters::new(),
        }
    }

    pub fn with_azure_blob(mut self, storage_account: impl Into<String>) -> Self {
        self.protocol = Some(Protocol::AzureBlob {
            storage_account: storage_account.into(),
        });
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn with_parameters(mut self, parameters: impl Into<BucketParameters>) -> Self {
        self.parameters = parameters.into();
        self
    }
}

/// Request to grant an account access to a bucket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantBucketAccessRequest {
    pub bucket_id: String,
    pub account_name: String,
    pub access_policy: String,
    pub parameters: BucketParameters,
}

/// Result of a grant. No access model is kept, so both fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketAccess {
    pub account_id: String,
    pub credentials: String,
}

/// Request to revoke an account's access to a bucket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevokeBucketAccessRequest {
    pub bucket_id: String,
    pub account_id: String,
}
