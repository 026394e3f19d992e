//! Identity service

use crate::error::{DaemonError, Result};
use crate::pb::identity_server::Identity;
use crate::pb::{ProvisionerGetInfoRequest, ProvisionerGetInfoResponse};
use tonic::{Request, Response, Status};

#[derive(Debug, Clone)]
pub struct IdentityService {
    driver_name: String,
}

impl IdentityService {
    pub fn new(driver_name: impl Into<String>) -> Result<Self> {
        let driver_name = driver_name.into();
        if driver_name.trim().is_empty() {
            return Err(DaemonError::EmptyDriverName);
        }
        Ok(Self { driver_name })
    }

    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }
}

#[tonic::async_trait]
impl Identity for IdentityService {
    #[tracing::instrument(skip_all)]
    async fn provisioner_get_info(
        &self,
        _req: Request<ProvisionerGetInfoRequest>,
    ) -> std::result::Result<Response<ProvisionerGetInfoResponse>, Status> {
        Ok(Response::new(ProvisionerGetInfoResponse {
            name: self.driver_name.clone(),
        }))
    }
}
