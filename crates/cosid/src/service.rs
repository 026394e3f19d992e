//! Provisioner gRPC service wrapping BucketProvisioner

use crate::pb::provisioner_server::Provisioner;
use crate::pb::{
    self, ProvisionerCreateBucketRequest, ProvisionerCreateBucketResponse,
    ProvisionerDeleteBucketRequest, ProvisionerDeleteBucketResponse,
    ProvisionerGrantBucketAccessRequest, ProvisionerGrantBucketAccessResponse,
    ProvisionerRevokeBucketAccessRequest, ProvisionerRevokeBucketAccessResponse,
};
use cosi_provisioner::{
    BackendError, BucketProvisioner, CreateBucketRequest, GrantBucketAccessRequest,
    ProvisionError, Protocol, RevokeBucketAccessRequest,
};
use std::sync::Arc;
use tonic::{Request, Response, Status};

#[derive(Clone)]
pub struct ProvisionerService {
    provisioner: Arc<BucketProvisioner>,
}

impl ProvisionerService {
    pub fn new(provisioner: Arc<BucketProvisioner>) -> Self {
        Self { provisioner }
    }

    pub fn provisioner(&self) -> &Arc<BucketProvisioner> {
        &self.provisioner
    }
}

/// Map a provisioning error onto a gRPC status, keeping the message
pub fn map_provision_err(e: ProvisionError) -> Status {
    let message = e.to_string();
    match e {
        ProvisionError::InvalidArgument(_) => Status::invalid_argument(message),
        ProvisionError::AlreadyExists(_) => Status::already_exists(message),
        ProvisionError::Backend(BackendError::NotFound(_)) => Status::not_found(message),
        ProvisionError::Backend(BackendError::InvalidParameters(_)) => {
            Status::invalid_argument(message)
        }
        ProvisionError::Backend(BackendError::Authentication(_)) => {
            Status::unauthenticated(message)
        }
        ProvisionError::Backend(_) => Status::unknown(message),
    }
}

fn protocol_from_pb(protocol: Option<pb::Protocol>) -> Option<Protocol> {
    use pb::protocol::Type;

    protocol.and_then(|p| p.r#type).map(|t| match t {
        Type::S3(s3) => Protocol::S3 { region: s3.region },
        Type::AzureBlob(azure) => Protocol::AzureBlob {
            storage_account: azure.storage_account,
        },
        Type::Gcs(gcs) => Protocol::Gcs {
            project_id: gcs.project_id,
        },
    })
}

#[tonic::async_trait]
impl Provisioner for ProvisionerService {
    #[tracing::instrument(skip(self, req), fields(method = "create_bucket"))]
    async fn provisioner_create_bucket(
        &self,
        req: Request<ProvisionerCreateBucketRequest>,
    ) -> Result<Response<ProvisionerCreateBucketResponse>, Status> {
        let inner = req.into_inner();
        let request = CreateBucketRequest {
            name: inner.name,
            protocol: protocol_from_pb(inner.protocol),
            parameters: inner.parameters.into(),
        };

        let bucket_id = self
            .provisioner
            .create_bucket(request)
            .await
            .map_err(map_provision_err)?;
        Ok(Response::new(ProvisionerCreateBucketResponse { bucket_id }))
    }

    #[tracing::instrument(skip(self, req), fields(method = "delete_bucket"))]
    async fn provisioner_delete_bucket(
        &self,
        req: Request<ProvisionerDeleteBucketRequest>,
    ) -> Result<Response<ProvisionerDeleteBucketResponse>, Status> {
        let bucket_id = req.into_inner().bucket_id;

        self.provisioner
            .delete_bucket(&bucket_id)
            .await
            .map_err(map_provision_err)?;
        Ok(Response::new(ProvisionerDeleteBucketResponse {}))
    }

    #[tracing::instrument(skip(self, req), fields(method = "grant_bucket_access"))]
    async fn provisioner_grant_bucket_access(
        &self,
        req: Request<ProvisionerGrantBucketAccessRequest>,
    ) -> Result<Response<ProvisionerGrantBucketAccessResponse>, Status> {
        let inner = req.into_inner();
        let request = GrantBucketAccessRequest {
            bucket_id: inner.bucket_id,
            account_name: inner.account_name,
            access_policy: inner.access_policy,
            parameters: inner.parameters.into(),
        };

        let access = self
            .provisioner
            .grant_bucket_access(request)
            .await
            .map_err(map_provision_err)?;
        Ok(Response::new(ProvisionerGrantBucketAccessResponse {
            account_id: access.account_id,
            credentials: access.credentials,
        }))
    }

    #[tracing::instrument(skip(self, req), fields(method = "revoke_bucket_access"))]
    async fn provisioner_revoke_bucket_access(
        &self,
        req: Request<ProvisionerRevokeBucketAccessRequest>,
    ) -> Result<Response<ProvisionerRevokeBucketAccessResponse>, Status> {
        let inner = req.into_inner();
        let request = RevokeBucketAccessRequest {
            bucket_id: inner.bucket_id,
            account_id: inner.account_id,
        };

        self.provisioner
            .revoke_bucket_access(request)
            .await
            .map_err(map_provision_err)?;
        Ok(Response::new(ProvisionerRevokeBucketAccessResponse {}))
    }
}
