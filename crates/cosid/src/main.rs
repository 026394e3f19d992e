use anyhow::Context;
use clap::{Parser, ValueEnum};
use cosi_config::{DEFAULT_ENDPOINT, DriverConfig, load_config};
use cosi_provisioner::{BucketProvisioner, InMemoryBackend, ObjectStoreBackend};
use cosi_provisioner_azure::{AzureBlobBackend, AzureConfig};
use cosid::{Endpoint, IdentityService, LogFormat, ProvisionerService};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "cosid", version)]
#[command(about = "COSI provisioner driver for Azure Blob Storage", long_about = None)]
struct Cli {
    /// gRPC endpoint (unix:///path/to.sock or tcp://host:port)
    #[arg(long, env = "COSI_ENDPOINT")]
    endpoint: Option<String>,

    /// Config file (default: searched, see cosi-config)
    #[arg(long, env = "COSI_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Driver name reported by ProvisionerGetInfo
    #[arg(long)]
    driver_name: Option<String>,

    /// Object store backend
    #[arg(long, value_enum, default_value_t = BackendKind::Azure)]
    backend: BackendKind,

    /// Log output format
    #[arg(long, value_enum, env = "COSI_LOG_FORMAT", default_value_t = LogFormat::Human)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    /// Azure Blob Storage
    Azure,
    /// In-process store, nothing leaves the daemon
    Memory,
}

fn build_backend(
    kind: BackendKind,
    config: &DriverConfig,
) -> anyhow::Result<Arc<dyn ObjectStoreBackend>> {
    match kind {
        BackendKind::Azure => {
            let azure = AzureConfig::resolve(&config.azure)
                .context("Azure credentials are incomplete")?;
            tracing::info!(
                subscription = %azure.subscription_id,
                resource_group = %azure.resource_group,
                "Using Azure Blob backend"
            );
            Ok(Arc::new(AzureBlobBackend::new(azure)?))
        }
        BackendKind::Memory => {
            tracing::warn!("Using in-memory backend, buckets are not persisted");
            Ok(Arc::new(InMemoryBackend::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cosid::init_tracing(cli.log_format);

    let config = load_config(cli.config.clone()).context("Failed to load configuration")?;

    let endpoint: Endpoint = cli
        .endpoint
        .as_deref()
        .unwrap_or(if config.endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            config.endpoint.as_str()
        })
        .parse()?;
    let driver_name = cli.driver_name.clone().unwrap_or_else(|| config.driver_name.clone());

    let identity = IdentityService::new(driver_name)?;
    let backend = build_backend(cli.backend, &config)?;
    let provisioner = ProvisionerService::new(Arc::new(BucketProvisioner::new(backend)));

    tracing::info!(
        driver = %identity.driver_name(),
        backend = %provisioner.provisioner().backend_name(),
        endpoint = %endpoint,
        version = env!("CARGO_PKG_VERSION"),
        "Starting cosid"
    );

    cosid::serve(&endpoint, identity, provisioner, shutdown_signal()).await?;
    Ok(())
}
