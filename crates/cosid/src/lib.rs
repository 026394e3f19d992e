//! blob-cosi driver daemon
//!
//! Exposes the COSI `Identity` and `Provisioner` gRPC services on a unix
//! socket or tcp address and forwards provisioner calls to a
//! [`BucketProvisioner`](cosi_provisioner::BucketProvisioner).

pub mod endpoint;
pub mod error;
pub mod identity;
pub mod logging;
pub mod service;

pub mod pb {
    tonic::include_proto!("cosi.v1alpha1");
}

pub use endpoint::{Endpoint, serve};
pub use error::{DaemonError, Result};
pub use identity::IdentityService;
pub use logging::{LogFormat, init_tracing};
pub use service::ProvisionerService;
