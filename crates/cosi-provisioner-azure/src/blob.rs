//! Blob service container operations

use crate::container::ContainerUrl;
use crate::error::{AzureError, Result};
use crate::shared_key::{STORAGE_API_VERSION, SharedKeyCredential, format_ms_date};
use cosi_provisioner::BucketParameters;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;

const CONTAINER_ALREADY_EXISTS: &str = "ContainerAlreadyExists";
const CONTAINER_NOT_FOUND: &str = "ContainerNotFound";
const ERROR_CODE_HEADER: &str = "x-ms-error-code";
const METADATA_PREFIX: &str = "x-ms-meta-";

/// Outcome of a container create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerCreation {
    Created,
    AlreadyExisted,
}

/// Blob service client for container-level calls
pub struct BlobClient {
    client: reqwest::Client,
    storage_suffix: String,
}

impl BlobClient {
    pub fn new(client: reqwest::Client, storage_suffix: impl Into<String>) -> Self {
        Self {
            client,
            storage_suffix: storage_suffix.into(),
        }
    }

    pub fn container_url(&self, account: &str, container: &str) -> ContainerUrl {
        ContainerUrl::new(account, container, self.storage_suffix.as_str())
    }

    /// Create a container carrying `parameters` as metadata.
    ///
    /// An existing container with the same name counts as success.
    pub async fn create_container(
        &self,
        credential: &SharedKeyCredential,
        container: &str,
        parameters: &BucketParameters,
    ) -> Result<(ContainerUrl, ContainerCreation)> {
        let url = self.container_url(credential.account(), container);
        let metadata = metadata_headers(parameters)?;

        let response = self
            .send(credential, Method::PUT, &url, metadata)
            .await?;

        match classify_create(response.status(), error_code(&response)) {
            Some(ContainerCreation::AlreadyExisted) => {
                tracing::info!(container = %url, "Container already exists");
                Ok((url, ContainerCreation::AlreadyExisted))
            }
            Some(outcome) => Ok((url, outcome)),
            None => Err(blob_error(response).await),
        }
    }

    /// Delete a container. A container that is already gone counts as deleted.
    pub async fn delete_container(
        &self,
        credential: &SharedKeyCredential,
        url: &ContainerUrl,
    ) -> Result<()> {
        let response = self
            .send(credential, Method::DELETE, url, BTreeMap::new())
            .await?;

        let status = response.status();
        if !delete_succeeded(status, error_code(&response)) {
            return Err(blob_error(response).await);
        }
        if status == StatusCode::NOT_FOUND {
            tracing::warn!(container = %url, "Container not found, treating as deleted");
        }
        Ok(())
    }

    async fn send(
        &self,
        credential: &SharedKeyCredential,
        method: Method,
        url: &ContainerUrl,
        mut headers: BTreeMap<String, String>,
    ) -> Result<reqwest::Response> {
        let query = [("restype", "container")];
        let path = format!("/{}", url.container);

        headers.insert("content-length".to_string(), "0".to_string());
        headers.insert("x-ms-date".to_string(), format_ms_date(chrono::Utc::now()));
        headers.insert("x-ms-version".to_string(), STORAGE_API_VERSION.to_string());

        let authorization = credential.authorization(method.as_str(), &path, &query, &headers);

        let mut request = self
            .client
            .request(method, url.to_string())
            .query(&query)
            .header(reqwest::header::AUTHORIZATION, authorization);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }

        Ok(request.send().await?)
    }
}

/// Turn bucket parameters into `x-ms-meta-*` headers.
///
/// Metadata names must be valid identifiers and values plain ASCII,
/// otherwise the request is rejected before it reaches Azure.
pub fn metadata_headers(parameters: &BucketParameters) -> Result<BTreeMap<String, String>> {
    let mut headers = BTreeMap::new();

    for (key, value) in parameters.iter() {
        if !is_identifier(key) {
            return Err(AzureError::InvalidParameters(format!(
                "parameter name '{}' cannot be stored as container metadata",
                key
            )));
        }
        if !value.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
            return Err(AzureError::InvalidParameters(format!(
                "parameter '{}' has a value that cannot be stored as container metadata",
                key
            )));
        }

        let name = format!("{}{}", METADATA_PREFIX, key.to_ascii_lowercase());
        if headers.insert(name, value.to_string()).is_some() {
            return Err(AzureError::InvalidParameters(format!(
                "parameter '{}' is given more than once with different case",
                key
            )));
        }
    }

    Ok(headers)
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Outcome of a container PUT, `None` when the response is an error
fn classify_create(status: StatusCode, code: Option<&str>) -> Option<ContainerCreation> {
    match status {
        StatusCode::CREATED => Some(ContainerCreation::Created),
        StatusCode::CONFLICT if code == Some(CONTAINER_ALREADY_EXISTS) => {
            Some(ContainerCreation::AlreadyExisted)
        }
        _ => None,
    }
}

/// Whether a container DELETE left the container gone
fn delete_succeeded(status: StatusCode, code: Option<&str>) -> bool {
    match status {
        StatusCode::ACCEPTED => true,
        StatusCode::NOT_FOUND => code == Some(CONTAINER_NOT_FOUND),
        _ => false,
    }
}

fn error_code(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(ERROR_CODE_HEADER)
        .and_then(|v| v.to_str().ok())
}

async fn blob_error(response: reqwest::Response) -> AzureError {
    let status = response.status();
    let header_code = error_code(&response).map(str::to_string);
    let body = response.text().await.unwrap_or_default();
    let parsed = parse_error_body(&body);

    let code = header_code
        .or_else(|| parsed.as_ref().map(|e| e.code.clone()).filter(|c| !c.is_empty()))
        .unwrap_or_else(|| status.as_u16().to_string());
    let message = parsed
        .as_ref()
        .and_then(StorageErrorBody::summary)
        .unwrap_or_else(|| status.to_string());

    AzureError::ApiError {
        status: status.as_u16(),
        code,
        message,
    }
}

/// Blob service XML error body
#[derive(Debug, Deserialize)]
struct StorageErrorBody {
    #[serde(rename = "Code", default)]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

impl StorageErrorBody {
    /// First line of the message; the rest is request id and timestamp
    fn summary(&self) -> Option<String> {
        let message = self.message.lines().next().unwrap_or_default().trim();
        (!message.is_empty()).then(|| message.to_string())
    }
}

fn parse_error_body(body: &str) -> Option<StorageErrorBody> {
    quick_xml::de::from_str(body.trim_start_matches('\u{feff}')).ok()
}
