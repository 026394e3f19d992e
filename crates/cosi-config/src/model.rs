//! Driver configuration model

use serde::{Deserialize, Serialize};

pub const DEFAULT_DRIVER_NAME: &str = "blob.cosi.azure.com";
pub const DEFAULT_ENDPOINT: &str = "unix:///var/lib/cosi/cosi.sock";

/// Driver configuration as read from `cosi.kdl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Name reported through the identity service
    pub driver_name: String,

    /// gRPC endpoint (`unix://<path>` or `tcp://<host:port>`)
    pub endpoint: String,

    /// Azure settings; every field may also come from the environment
    pub azure: AzureSection,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            driver_name: DEFAULT_DRIVER_NAME.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            azure: AzureSection::default(),
        }
    }
}

/// Raw `azure { ... }` block. Values stay optional here; the backend decides
/// which ones are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureSection {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub subscription_id: Option<String>,
    pub resource_group: Option<String>,
    pub location: Option<String>,
    pub storage_suffix: Option<String>,
}
