//! Provisioning error types

use thiserror::Error;

/// Errors reported by an object-store backend.
///
/// Provider crates keep their own richer error enums and convert into this
/// one at the [`ObjectStoreBackend`](crate::ObjectStoreBackend) boundary.
/// The message is carried through to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Bucket not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Errors returned by [`BucketProvisioner`](crate::BucketProvisioner) operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Bucket {0} exists with different parameters")]
    AlreadyExists(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
