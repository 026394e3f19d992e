//! cosi.kdl parser

use crate::error::{ConfigError, Result};
use crate::model::{AzureSection, DriverConfig};
use kdl::{KdlDocument, KdlNode};
use std::path::Path;

/// Parse a KDL file into a [`DriverConfig`]
pub fn parse_config_file(path: &Path) -> Result<DriverConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse a KDL string into a [`DriverConfig`]
///
/// Nodes that are not present keep their defaults; unknown nodes are skipped.
pub fn parse_config(content: &str) -> Result<DriverConfig> {
    let doc: KdlDocument = content.parse()?;

    let mut config = DriverConfig::default();

    for node in doc.nodes() {
        match node.name().value() {
            "driver" => config.driver_name = required_string(node)?,
            "endpoint" => config.endpoint = required_string(node)?,
            "azure" => config.azure = parse_azure(node)?,
            other => tracing::debug!(node = other, "Skipping unknown config node"),
        }
    }

    Ok(config)
}

fn parse_azure(node: &KdlNode) -> Result<AzureSection> {
    let mut azure = AzureSection::default();

    let Some(children) = node.children() else {
        return Ok(azure);
    };

    for child in children.nodes() {
        let value = Some(required_string(child)?);
        match child.name().value() {
            "tenant-id" => azure.tenant_id = value,
            "client-id" => azure.client_id = value,
            "client-secret" => azure.client_secret = value,
            "subscription-id" => azure.subscription_id = value,
            "resource-group" => azure.resource_group = value,
            "location" => azure.location = value,
            "storage-suffix" => azure.storage_suffix = value,
            other => tracing::debug!(node = other, "Skipping unknown azure setting"),
        }
    }

    Ok(azure)
}

/// First argument of a node as a string
fn required_string(node: &KdlNode) -> Result<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            ConfigError::InvalidConfig(format!(
                "{} requires a string value",
                node.name().value()
            ))
        })
}
