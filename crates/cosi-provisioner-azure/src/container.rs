//! Container naming and container URLs
//!
//! A bucket ID handed out by this backend is the container URL
//! `https://{account}.blob.{suffix}/{container}`. Deletes only receive that
//! ID, so the account and container are recovered from it.

use crate::error::{AzureError, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static CONTAINER_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://([a-z0-9]+)\.blob\.([^/]+)/([^/?#]+)/?$").expect("valid regex")
});

/// Parsed container URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerUrl {
    pub account: String,
    pub container: String,
    pub storage_suffix: String,
}

impl ContainerUrl {
    pub fn new(
        account: impl Into<String>,
        container: impl Into<String>,
        storage_suffix: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            container: container.into(),
            storage_suffix: storage_suffix.into(),
        }
    }

    /// Parse a bucket ID back into account and container
    pub fn parse(bucket_id: &str) -> Result<Self> {
        let captures = CONTAINER_URL_RE
            .captures(bucket_id)
            .ok_or_else(|| AzureError::InvalidBucketId(bucket_id.to_string()))?;

        Ok(Self::new(&captures[1], &captures[3], &captures[2]))
    }

    /// Base URL of the account's blob service
    pub fn service_url(&self) -> String {
        format!("https://{}.blob.{}", self.account, self.storage_suffix)
    }
}

impl fmt::Display for ContainerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service_url(), self.container)
    }
}

/// Validate a container name against Blob Storage naming rules:
/// 3-63 characters of lowercase letters, digits and single hyphens,
/// starting and ending with a letter or digit.
pub fn validate_container_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(AzureError::InvalidContainerName(format!(
            "{}: {}",
            name, reason
        )))
    };

    if !(3..=63).contains(&name.len()) {
        return invalid("must be 3-63 characters long");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return invalid("only lowercase letters, digits and hyphens are allowed");
    }
    if name.starts_with('-') || name.ends_with('-') {
        return invalid("must start and end with a letter or digit");
    }
    if name.contains("--") {
        return invalid("consecutive hyphens are not allowed");
    }
    Ok(())
}

/// Validate a storage account name: 3-24 lowercase letters and digits
pub fn validate_account_name(name: &str) -> Result<()> {
    if (3..=24).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        Ok(())
    } else {
        Err(AzureError::InvalidAccountName(format!(
            "{}: must be 3-24 lowercase letters and digits",
            name
        )))
    }
}
