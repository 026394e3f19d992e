//! Azure Resource Manager client for storage accounts
//!
//! Authenticates with a service principal (client credentials) and manages
//! storage accounts inside the configured resource group.

use crate::config::AzureConfig;
use crate::error::{AzureError, Result};
use crate::options::StorageAccountOptions;
use cosi_provisioner::RetryConfig;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const STORAGE_API_VERSION: &str = "2023-01-01";
const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Tokens are refreshed this long before they expire
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

const PROVISIONING_SUCCEEDED: &str = "Succeeded";

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// ARM client scoped to one subscription and resource group
pub struct ArmClient {
    client: reqwest::Client,
    config: AzureConfig,
    token: Mutex<Option<AccessToken>>,
    provisioning_retry: RetryConfig,
}

impl ArmClient {
    pub fn new(client: reqwest::Client, config: AzureConfig) -> Self {
        Self {
            client,
            config,
            token: Mutex::new(None),
            provisioning_retry: RetryConfig {
                max_attempts: 30,
                initial_delay: Duration::from_secs(2),
                max_delay: Duration::from_secs(15),
                backoff_multiplier: 1.5,
            },
        }
    }

    /// Override how long to wait for a new account to finish provisioning
    pub fn with_provisioning_retry(mut self, retry: RetryConfig) -> Self {
        self.provisioning_retry = retry;
        self
    }

    fn account_url(&self, account: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Storage/storageAccounts/{}",
            self.config.management_endpoint.trim_end_matches('/'),
            self.config.subscription_id,
            self.config.resource_group,
            account
        )
    }

    async fn bearer_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(token.value.clone());
        }

        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.config.authority_host.trim_end_matches('/'),
            self.config.tenant_id
        );
        tracing::debug!(tenant = %self.config.tenant_id, "Requesting management token");

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", MANAGEMENT_SCOPE),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| e.error_description.unwrap_or(e.error))
                .unwrap_or_else(|_| status.to_string());
            return Err(AzureError::AuthenticationFailed(detail));
        }

        let token: TokenResponse = response.json().await?;
        let value = token.access_token.clone();
        *cached = Some(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(value)
    }

    /// Fetch a storage account, `None` when it doesn't exist
    pub async fn get_storage_account(&self, account: &str) -> Result<Option<StorageAccount>> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .get(self.account_url(account))
            .query(&[("api-version", STORAGE_API_VERSION)])
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_response(response).await?;
        Ok(Some(response.json().await?))
    }

    /// Make sure the storage account exists and has finished provisioning.
    ///
    /// Creates the account from `options` when it is missing.
    #[tracing::instrument(skip(self, options))]
    pub async fn ensure_storage_account(
        &self,
        account: &str,
        options: &StorageAccountOptions,
    ) -> Result<()> {
        match self.get_storage_account(account).await? {
            Some(existing) if existing.is_ready() => {
                tracing::debug!("Storage account already exists");
                return Ok(());
            }
            Some(existing) => {
                tracing::info!(
                    state = ?existing.provisioning_state(),
                    "Storage account is still provisioning"
                );
            }
            None => self.create_storage_account(account, options).await?,
        }

        self.wait_until_ready(account).await
    }

    async fn create_storage_account(
        &self,
        account: &str,
        options: &StorageAccountOptions,
    ) -> Result<()> {
        let body = options.to_create_body(self.config.location.as_deref())?;
        tracing::info!(sku = %options.sku, kind = %options.kind, "Creating storage account");

        let token = self.bearer_token().await?;
        let response = self
            .client
            .put(self.account_url(account))
            .query(&[("api-version", STORAGE_API_VERSION)])
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        check_response(response).await?;
        Ok(())
    }

    async fn wait_until_ready(&self, account: &str) -> Result<()> {
        let retry = &self.provisioning_retry;

        for attempt in 0..retry.max_attempts {
            tokio::time::sleep(retry.delay_for(attempt)).await;

            if let Some(current) = self.get_storage_account(account).await? {
                if current.is_ready() {
                    tracing::info!(attempts = attempt + 1, "Storage account is ready");
                    return Ok(());
                }
                tracing::debug!(
                    attempt,
                    state = ?current.provisioning_state(),
                    "Waiting for storage account"
                );
            }
        }

        Err(AzureError::ProvisioningTimeout(account.to_string()))
    }

    /// Return the first access key of the storage account
    pub async fn list_keys(&self, account: &str) -> Result<String> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .post(format!("{}/listKeys", self.account_url(account)))
            .query(&[("api-version", STORAGE_API_VERSION)])
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;

        let keys: ListKeysResponse = check_response(response).await?.json().await?;
        keys.keys
            .into_iter()
            .next()
            .map(|k| k.value)
            .ok_or_else(|| AzureError::InvalidAccountKey(format!("{}: no keys returned", account)))
    }
}

async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(parse_arm_error(status, &body))
}

fn parse_arm_error(status: u16, body: &str) -> AzureError {
    match serde_json::from_str::<ArmErrorResponse>(body) {
        Ok(parsed) => AzureError::ApiError {
            status,
            code: parsed.error.code,
            message: parsed.error.message,
        },
        Err(_) => AzureError::ApiError {
            status,
            code: status.to_string(),
            message: body.trim().to_string(),
        },
    }
}

/// Subset of the ARM storage account resource
#[derive(Debug, Clone, Deserialize)]
pub struct StorageAccount {
    pub name: String,
    pub location: Option<String>,
    #[serde(default)]
    pub properties: Option<StorageAccountProperties>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountProperties {
    pub provisioning_state: Option<String>,
}

impl StorageAccount {
    pub fn provisioning_state(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.provisioning_state.as_deref())
    }

    pub fn is_ready(&self) -> bool {
        self.provisioning_state() == Some(PROVISIONING_SUCCEEDED)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListKeysResponse {
    keys: Vec<AccountKey>,
}

#[derive(Debug, Deserialize)]
struct AccountKey {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ArmErrorResponse {
    error: ArmErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ArmErrorDetail {
    code: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_AUTHORITY_HOST, DEFAULT_MANAGEMENT_ENDPOINT};

    fn config() -> AzureConfig {
        AzureConfig {
            tenant_id: "tenant".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            subscription_id: "sub".to_string(),
            resource_group: "rg".to_string(),
            location: Some("eastus".to_string()),
            storage_suffix: "core.windows.net".to_string(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            management_endpoint: format!("{}/", DEFAULT_MANAGEMENT_ENDPOINT),
        }
    }

    #[test]
    fn test_account_url() {
        let arm = ArmClient::new(reqwest::Client::new(), config());
        assert_eq!(
            arm.account_url("acct1"),
            "https://management.azure.com/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/acct1"
        );
    }

    #[test]
    fn test_token_freshness() {
        let now = Instant::now();
        let token = AccessToken {
            value: "t".to_string(),
            expires_at: now + Duration::from_secs(3600),
        };
        assert!(token.is_fresh(now));

        let expiring = AccessToken {
            value: "t".to_string(),
            expires_at: now + Duration::from_secs(30),
        };
        assert!(!expiring.is_fresh(now));
    }

    #[test]
    fn test_parse_arm_error() {
        let body = r#"{"error":{"code":"StorageAccountAlreadyTaken","message":"The storage account named acct1 is already taken."}}"#;
        match parse_arm_error(409, body) {
            AzureError::ApiError {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(code, "StorageAccountAlreadyTaken");
                assert!(message.contains("already taken"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_arm_error_without_json() {
        match parse_arm_error(502, "Bad Gateway\n") {
            AzureError::ApiError { code, message, .. } => {
                assert_eq!(code, "502");
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_storage_account_state() {
        let account: StorageAccount = serde_json::from_str(
            r#"{"name":"acct1","location":"eastus","properties":{"provisioningState":"Creating"}}"#,
        )
        .unwrap();
        assert_eq!(account.provisioning_state(), Some("Creating"));
        assert!(!account.is_ready());

        let ready: StorageAccount = serde_json::from_str(
            r#"{"name":"acct1","properties":{"provisioningState":"Succeeded"}}"#,
        )
        .unwrap();
        assert!(ready.is_ready());
    }
}
