//! blob-cosi bucket provisioning
//!
//! This crate holds the state manager behind the COSI provisioner service:
//! it accepts create/delete requests, keeps bucket names and backend IDs
//! consistent under concurrent access, and decides when the backing object
//! store actually has to be called.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              cosid (gRPC transport)              │
//! │        ProvisionerCreateBucket / Delete ...      │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               cosi-provisioner                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │            BucketProvisioner              │   │
//! │  │   idempotency / conflict decisions        │   │
//! │  └──────────────────┬───────────────────────┘   │
//! │  ┌──────────────────▼───┐  ┌────────────────┐   │
//! │  │ Registry             │  │ trait          │   │
//! │  │ name ⇄ bucket id     │  │ ObjectStore-   │   │
//! │  └──────────────────────┘  │ Backend        │   │
//! │                            └───────┬────────┘   │
//! └────────────────────────────────────┼────────────┘
//!                                      │
//!                 ┌────────────────────┴──────┐
//!         ┌───────▼───────┐          ┌────────▼──────┐
//!         │  azure blob   │          │   in-memory   │
//!         │   backend     │          │    backend    │
//!         └───────────────┘          └───────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use cosi_provisioner::{BucketProvisioner, CreateBucketRequest, InMemoryBackend};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let provisioner = BucketProvisioner::new(Arc::new(InMemoryBackend::new()));
//!
//! let request = CreateBucketRequest::new("logs")
//!     .with_azure_blob("acct1")
//!     .with_parameters([("tier", "hot")].into_iter().collect::<cosi_provisioner::BucketParameters>());
//!
//! let id = provisioner.create_bucket(request.clone()).await.unwrap();
//! assert_eq!(id, "acct1/logs");
//! assert_eq!(provisioner.create_bucket(request).await.unwrap(), id);
//! # });
//! ```

pub mod backend;
pub mod error;
pub mod memory;
pub mod parameters;
pub mod provisioner;
pub mod registry;
pub mod request;

// Re-exports
pub use backend::{ObjectStoreBackend, RetryConfig};
pub use error::{BackendError, ProvisionError, Result};
pub use memory::InMemoryBackend;
pub use parameters::BucketParameters;
pub use provisioner::BucketProvisioner;
pub use registry::{BucketRecord, Registration, Registry};
pub use request::{
    BucketAccess, CreateBucketRequest, GrantBucketAccessRequest, Protocol,
    RevokeBucketAccessRequest,
};
