//! Azure backend configuration

use crate::error::{AzureError, Result};
use cosi_config::AzureSection;

pub const DEFAULT_STORAGE_SUFFIX: &str = "core.windows.net";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// Credentials and placement for the Azure backend
#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub subscription_id: String,
    pub resource_group: String,
    /// Location for new storage accounts when the request doesn't name one
    pub location: Option<String>,
    pub storage_suffix: String,
    pub authority_host: String,
    pub management_endpoint: String,
}

impl AzureConfig {
    /// Create AzureConfig from environment variables only
    pub fn from_env() -> Result<Self> {
        Self::resolve(&AzureSection::default())
    }

    /// Merge a config-file section with the environment.
    ///
    /// `AZURE_*` variables override the file.
    pub fn resolve(section: &AzureSection) -> Result<Self> {
        Ok(Self {
            tenant_id: required("AZURE_TENANT_ID", &section.tenant_id)?,
            client_id: required("AZURE_CLIENT_ID", &section.client_id)?,
            client_secret: required("AZURE_CLIENT_SECRET", &section.client_secret)?,
            subscription_id: required("AZURE_SUBSCRIPTION_ID", &section.subscription_id)?,
            resource_group: required("AZURE_RESOURCE_GROUP", &section.resource_group)?,
            location: optional("AZURE_LOCATION", &section.location),
            storage_suffix: optional("AZURE_STORAGE_SUFFIX", &section.storage_suffix)
                .unwrap_or_else(|| DEFAULT_STORAGE_SUFFIX.to_string()),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            management_endpoint: DEFAULT_MANAGEMENT_ENDPOINT.to_string(),
        })
    }
}

fn optional(var: &str, file_value: &Option<String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| file_value.clone())
}

fn required(var: &str, file_value: &Option<String>) -> Result<String> {
    optional(var, file_value).ok_or_else(|| AzureError::MissingSetting(var.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const AZURE_VARS: [&str; 7] = [
        "AZURE_TENANT_ID",
        "AZURE_CLIENT_ID",
        "AZURE_CLIENT_SECRET",
        "AZURE_SUBSCRIPTION_ID",
        "AZURE_RESOURCE_GROUP",
        "AZURE_LOCATION",
        "AZURE_STORAGE_SUFFIX",
    ];

    fn full_section() -> AzureSection {
        AzureSection {
            tenant_id: Some("tenant".to_string()),
            client_id: Some("client".to_string()),
            client_secret: Some("secret".to_string()),
            subscription_id: Some("sub".to_string()),
            resource_group: Some("rg".to_string()),
            location: None,
            storage_suffix: None,
        }
    }

    fn cleared<F: FnOnce()>(f: F) {
        let unset: Vec<(&str, Option<&str>)> = AZURE_VARS.iter().map(|v| (*v, None)).collect();
        temp_env::with_vars(unset, f);
    }

    #[test]
    #[serial]
    fn test_resolve_from_section() {
        cleared(|| {
            let config = AzureConfig::resolve(&full_section()).unwrap();
            assert_eq!(config.tenant_id, "tenant");
            assert_eq!(config.resource_group, "rg");
            assert_eq!(config.storage_suffix, DEFAULT_STORAGE_SUFFIX);
            assert_eq!(config.location, None);
        });
    }

    #[test]
    #[serial]
    fn test_env_overrides_section() {
        cleared(|| {
            temp_env::with_vars(
                [
                    ("AZURE_RESOURCE_GROUP", Some("env-rg")),
                    ("AZURE_LOCATION", Some("westeurope")),
                ],
                || {
                    let config = AzureConfig::resolve(&full_section()).unwrap();
                    assert_eq!(config.resource_group, "env-rg");
                    assert_eq!(config.location.as_deref(), Some("westeurope"));
                },
            );
        });
    }

    #[test]
    #[serial]
    fn test_missing_setting() {
        cleared(|| {
            let mut section = full_section();
            section.client_secret = None;

            let err = AzureConfig::resolve(&section).unwrap_err();
            assert!(matches!(err, AzureError::MissingSetting(ref v) if v == "AZURE_CLIENT_SECRET"));
        });
    }
}
