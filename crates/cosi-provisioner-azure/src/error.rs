//! Azure backend error types

use cosi_provisioner::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("Missing Azure setting: {0}")]
    MissingSetting(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid container name: {0}")]
    InvalidContainerName(String),

    #[error("Invalid storage account name: {0}")]
    InvalidAccountName(String),

    #[error("Invalid bucket id: {0}")]
    InvalidBucketId(String),

    #[error("Invalid storage account key: {0}")]
    InvalidAccountKey(String),

    #[error("Azure AD authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Azure API error ({status} {code}): {message}")]
    ApiError {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Storage account {0} did not finish provisioning")]
    ProvisioningTimeout(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AzureError>;

impl From<AzureError> for BackendError {
    fn from(e: AzureError) -> Self {
        let message = e.to_string();
        match e {
            AzureError::InvalidParameters(_)
            | AzureError::InvalidContainerName(_)
            | AzureError::InvalidAccountName(_)
            | AzureError::InvalidBucketId(_) => BackendError::InvalidParameters(message),
            AzureError::MissingSetting(_)
            | AzureError::InvalidAccountKey(_)
            | AzureError::AuthenticationFailed(_) => BackendError::Authentication(message),
            AzureError::ApiError { status: 404, .. } => BackendError::NotFound(message),
            AzureError::ApiError {
                status: 401 | 403, ..
            } => BackendError::Authentication(message),
            AzureError::ApiError { .. }
            | AzureError::ProvisioningTimeout(_)
            | AzureError::Json(_) => BackendError::Api(message),
            AzureError::Http(_) => BackendError::Transport(message),
        }
    }
}
