//! Listening endpoint and gRPC server startup

use crate::error::{DaemonError, Result};
use crate::identity::IdentityService;
use crate::pb::identity_server::IdentityServer;
use crate::pb::provisioner_server::ProvisionerServer;
use crate::service::ProvisionerService;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::net::UnixListener;
use tokio_stream::wrappers::UnixListenerStream;
use tonic::transport::Server;
use tonic::transport::server::Router;

/// Where the driver listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Unix(PathBuf),
    Tcp(SocketAddr),
}

impl FromStr for Endpoint {
    type Err = DaemonError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(DaemonError::UnsupportedEndpoint(s.to_string()));
            }
            return Ok(Endpoint::Unix(PathBuf::from(path)));
        }

        if let Some(addr) = s.strip_prefix("tcp://") {
            return addr
                .parse()
                .map(Endpoint::Tcp)
                .map_err(|_| DaemonError::InvalidAddress(addr.to_string()));
        }

        Err(DaemonError::UnsupportedEndpoint(s.to_string()))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix://{}", path.display()),
            Endpoint::Tcp(addr) => write!(f, "tcp://{}", addr),
        }
    }
}

/// Router carrying both COSI services
pub fn router(identity: IdentityService, provisioner: ProvisionerService) -> Router {
    Server::builder()
        .add_service(IdentityServer::new(identity))
        .add_service(ProvisionerServer::new(provisioner))
}

/// Serve on `endpoint` until `shutdown` resolves
pub async fn serve<F>(
    endpoint: &Endpoint,
    identity: IdentityService,
    provisioner: ProvisionerService,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let router = router(identity, provisioner);

    match endpoint {
        Endpoint::Unix(path) => {
            let listener = bind_unix(path)?;
            tracing::info!(endpoint = %endpoint, "Listening");

            let result = router
                .serve_with_incoming_shutdown(UnixListenerStream::new(listener), shutdown)
                .await;

            if let Err(e) = std::fs::remove_file(path) {
                tracing::debug!(error = %e, "Could not remove socket file");
            }
            result?;
        }
        Endpoint::Tcp(addr) => {
            tracing::info!(endpoint = %endpoint, "Listening");
            router.serve_with_shutdown(*addr, shutdown).await?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Bind a unix socket, replacing a stale socket file left by a previous run
pub fn bind_unix(path: &Path) -> Result<UnixListener> {
    if path.exists() {
        tracing::info!(path = %path.display(), "Removing stale socket");
        std::fs::remove_file(path)?;
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    Ok(UnixListener::bind(path)?)
}
