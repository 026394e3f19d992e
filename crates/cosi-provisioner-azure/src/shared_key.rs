//! Shared Key authorization for the Blob service

use crate::error::{AzureError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// Blob service REST version sent with every data-plane request
pub const STORAGE_API_VERSION: &str = "2021-08-06";

/// Standard headers that take part in the string-to-sign, in order.
/// `Date` stays empty because requests carry `x-ms-date`.
const SIGNED_HEADERS: [&str; 11] = [
    "content-encoding",
    "content-language",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "if-modified-since",
    "if-match",
    "if-none-match",
    "if-unmodified-since",
    "range",
];

/// Account name plus decoded account key
#[derive(Clone)]
pub struct SharedKeyCredential {
    account: String,
    key: Vec<u8>,
}

impl std::fmt::Debug for SharedKeyCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeyCredential")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl SharedKeyCredential {
    pub fn new(account: impl Into<String>, base64_key: &str) -> Result<Self> {
        let account = account.into();
        let key = STANDARD
            .decode(base64_key.trim())
            .map_err(|e| AzureError::InvalidAccountKey(format!("{}: {}", account, e)))?;
        Ok(Self { account, key })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Sign a request and return the `Authorization` header value.
    ///
    /// `headers` keys must be lowercase. `path` is the URL path starting
    /// with `/`, without the query string.
    pub fn authorization(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, &str)],
        headers: &BTreeMap<String, String>,
    ) -> String {
        let string_to_sign = string_to_sign(&self.account, method, path, query, headers);

        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        format!("SharedKey {}:{}", self.account, signature)
    }
}

/// `x-ms-date` value for the given instant
pub fn format_ms_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub(crate) fn string_to_sign(
    account: &str,
    method: &str,
    path: &str,
    query: &[(&str, &str)],
    headers: &BTreeMap<String, String>,
) -> String {
    let mut out = String::new();
    out.push_str(method);
    out.push('\n');

    for name in SIGNED_HEADERS {
        let value = headers.get(name).map(String::as_str).unwrap_or("");
        // Content-Length of zero is signed as an empty string
        let value = if name == "content-length" && value == "0" {
            ""
        } else {
            value
        };
        out.push_str(value);
        out.push('\n');
    }

    for (name, value) in headers.iter().filter(|(name, _)| name.starts_with("x-ms-")) {
        out.push_str(name);
        out.push(':');
        out.push_str(value.trim());
        out.push('\n');
    }

    out.push('/');
    out.push_str(account);
    out.push_str(path);

    let mut params: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for &(name, value) in query {
        params.entry(name.to_lowercase()).or_default().push(value);
    }
    for (name, mut values) in params {
        values.sort_unstable();
        out.push('\n');
        out.push_str(&name);
        out.push(':');
        out.push_str(&values.join(","));
    }

    out
}
