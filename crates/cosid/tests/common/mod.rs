use cosi_provisioner::{BucketProvisioner, InMemoryBackend};
use cosid::pb::identity_client::IdentityClient;
use cosid::pb::provisioner_client::ProvisionerClient;
use cosid::{IdentityService, ProvisionerService};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Channel;

pub const DRIVER_NAME: &str = "test.cosi.example.com";

/// A cosid router running on an ephemeral local port
pub struct TestServer {
    pub addr: SocketAddr,
    pub backend: Arc<InMemoryBackend>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let backend = Arc::new(InMemoryBackend::new());
        let provisioner = BucketProvisioner::new(backend.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let router = cosid::endpoint::router(
            IdentityService::new(DRIVER_NAME).unwrap(),
            ProvisionerService::new(Arc::new(provisioner)),
        );
        let handle = tokio::spawn(async move {
            router
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            backend,
            shutdown: Some(tx),
            handle,
        }
    }

    async fn channel(&self) -> Channel {
        Channel::from_shared(format!("http://{}", self.addr))
            .unwrap()
            .connect()
            .await
            .unwrap()
    }

    pub async fn provisioner_client(&self) -> ProvisionerClient<Channel> {
        ProvisionerClient::new(self.channel().await)
    }

    pub async fn identity_client(&self) -> IdentityClient<Channel> {
        IdentityClient::new(self.channel().await)
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap();
    }
}
