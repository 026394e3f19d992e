//! Storage account options derived from bucket parameters

use crate::error::{AzureError, Result};
use cosi_provisioner::BucketParameters;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_SKU: &str = "Standard_LRS";
pub const DEFAULT_KIND: &str = "StorageV2";

const SKU_FIELDS: [&str; 2] = ["storageaccounttype", "skuname"];
const LOCATION_FIELD: &str = "location";
const KIND_FIELD: &str = "kind";
const TAGS_FIELD: &str = "tags";
const HTTPS_TRAFFIC_ONLY_FIELD: &str = "enablehttpstrafficonly";
const HNS_ENABLED_FIELD: &str = "ishnsenabled";
const NFS_V3_FIELD: &str = "enablenfsv3";
const LARGE_FILE_SHARES_FIELD: &str = "enablelargefileshares";

/// Options used when the storage account has to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageAccountOptions {
    pub sku: String,
    pub kind: String,
    pub location: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub enable_https_traffic_only: Option<bool>,
    pub is_hns_enabled: Option<bool>,
    pub enable_nfs_v3: Option<bool>,
    pub enable_large_file_shares: Option<bool>,
}

impl Default for StorageAccountOptions {
    fn default() -> Self {
        Self {
            sku: DEFAULT_SKU.to_string(),
            kind: DEFAULT_KIND.to_string(),
            location: None,
            tags: BTreeMap::new(),
            enable_https_traffic_only: None,
            is_hns_enabled: None,
            enable_nfs_v3: None,
            enable_large_file_shares: None,
        }
    }
}

impl StorageAccountOptions {
    /// Read account options from bucket parameters.
    ///
    /// Keys match case-insensitively; keys this backend doesn't know are
    /// ignored here and only travel as container metadata.
    pub fn from_parameters(parameters: &BucketParameters) -> Result<Self> {
        let mut options = Self::default();

        for (key, value) in parameters.iter() {
            let key = key.to_ascii_lowercase();
            match key.as_str() {
                k if SKU_FIELDS.contains(&k) => options.sku = value.to_string(),
                LOCATION_FIELD => options.location = Some(value.to_string()),
                KIND_FIELD => options.kind = value.to_string(),
                TAGS_FIELD => options.tags = parse_tags(value)?,
                HTTPS_TRAFFIC_ONLY_FIELD => options.enable_https_traffic_only = Some(is_true(value)),
                HNS_ENABLED_FIELD => options.is_hns_enabled = Some(is_true(value)),
                NFS_V3_FIELD => options.enable_nfs_v3 = Some(is_true(value)),
                LARGE_FILE_SHARES_FIELD => options.enable_large_file_shares = Some(is_true(value)),
                _ => {}
            }
        }

        Ok(options)
    }

    /// Build the ARM request body for creating the account
    pub(crate) fn to_create_body(&self, default_location: Option<&str>) -> Result<CreateAccountBody> {
        let location = self
            .location
            .as_deref()
            .or(default_location)
            .ok_or_else(|| {
                AzureError::InvalidParameters(
                    "location is required to create a storage account".to_string(),
                )
            })?;

        Ok(CreateAccountBody {
            sku: Sku {
                name: self.sku.clone(),
            },
            kind: self.kind.clone(),
            location: location.to_string(),
            tags: self.tags.clone(),
            properties: AccountProperties {
                supports_https_traffic_only: self.enable_https_traffic_only,
                is_hns_enabled: self.is_hns_enabled,
                is_nfs_v3_enabled: self.enable_nfs_v3,
                large_file_shares_state: self
                    .enable_large_file_shares
                    .map(|enabled| if enabled { "Enabled" } else { "Disabled" }.to_string()),
            },
        })
    }
}

fn is_true(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Parse `key1=value1,key2=value2` into a tag map
pub fn parse_tags(tags: &str) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();

    for pair in tags.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                map.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => {
                return Err(AzureError::InvalidParameters(format!(
                    "tags '{}' are invalid, the format should be 'key1=value1,key2=value2'",
                    tags
                )));
            }
        }
    }

    Ok(map)
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateAccountBody {
    sku: Sku,
    kind: String,
    location: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    tags: BTreeMap<String, String>,
    properties: AccountProperties,
}

#[derive(Debug, Serialize)]
struct Sku {
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    supports_https_traffic_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_hns_enabled: Option<bool>,
    #[serde(rename = "isNfsV3Enabled", skip_serializing_if = "Option::is_none")]
    is_nfs_v3_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    large_file_shares_state: Option<String>,
}
