//! Base cluster connection configuration.
//!
//! This is the connection/auth/timeout bag owned by the cluster client. The
//! resolver copies it by value into every [`crate::ResolvedConfig`] and never
//! validates it: a usable master URL is a precondition of resolution.

use cluster_overlay_shared::{SecretString, redact_if_secret};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default master endpoint (in-cluster service address).
pub const DEFAULT_MASTER_URL: &str = "https://kubernetes.default.svc";
/// Default primary API version.
pub const DEFAULT_API_VERSION: &str = "v1";

const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_WEBSOCKET_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_UPLOAD_CONNECTION_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_UPLOAD_REQUEST_TIMEOUT_MS: u64 = 120_000;
const DEFAULT_RETRY_BACKOFF_LIMIT: u32 = 10;
const DEFAULT_RETRY_BACKOFF_INTERVAL_MS: u64 = 100;

/// Cluster connection settings shared by every API surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseConfig {
    /// Master (API server) URL.
    pub master_url: String,
    /// Primary API version.
    pub api_version: String,
    /// Default namespace for namespaced operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// TLS and authentication material.
    pub credentials: Credentials,
    /// Transport timeouts.
    pub timeouts: Timeouts,
    /// HTTP(S) proxy settings.
    pub proxy: ProxySettings,
    /// Extra headers sent with every request.
    #[serde(skip_serializing_if = "CustomHeaders::is_empty")]
    pub custom_headers: CustomHeaders,
    /// Request retry policy.
    pub retry: RetryPolicy,
    /// User agent override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            master_url: DEFAULT_MASTER_URL.to_owned(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            namespace: None,
            credentials: Credentials::default(),
            timeouts: Timeouts::default(),
            proxy: ProxySettings::default(),
            custom_headers: CustomHeaders::default(),
            retry: RetryPolicy::default(),
            user_agent: None,
        }
    }
}

impl BaseConfig {
    /// Default config pointed at `master_url`.
    pub fn for_master(master_url: impl Into<String>) -> Self {
        Self {
            master_url: master_url.into(),
            ..Self::default()
        }
    }
}

/// TLS trust and client authentication material.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    /// Skip server certificate verification.
    pub trust_certs: bool,
    /// Skip hostname verification.
    pub disable_hostname_verification: bool,
    /// CA bundle path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert_file: Option<String>,
    /// Inline CA bundle (base64 PEM).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert_data: Option<String>,
    /// Client certificate path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_cert_file: Option<String>,
    /// Inline client certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_cert_data: Option<String>,
    /// Client key path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key_file: Option<String>,
    /// Inline client key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key_data: Option<SecretString>,
    /// Client key algorithm (`RSA`, `EC`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key_algo: Option<String>,
    /// Client key passphrase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key_passphrase: Option<SecretString>,
    /// Basic auth username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Basic auth password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretString>,
    /// Bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_token: Option<SecretString>,
}

/// Transport timeouts, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timeouts {
    /// TCP connect timeout.
    pub connection_timeout_ms: u64,
    /// Per-request timeout.
    pub request_timeout_ms: u64,
    /// Websocket handshake timeout.
    pub websocket_timeout_ms: u64,
    /// Upload connect timeout.
    pub upload_connection_timeout_ms: u64,
    /// Upload request timeout.
    pub upload_request_timeout_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connection_timeout_ms: DEFAULT_CONNECTION_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            websocket_timeout_ms: DEFAULT_WEBSOCKET_TIMEOUT_MS,
            upload_connection_timeout_ms: DEFAULT_UPLOAD_CONNECTION_TIMEOUT_MS,
            upload_request_timeout_ms: DEFAULT_UPLOAD_REQUEST_TIMEOUT_MS,
        }
    }
}

/// Proxy routing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxySettings {
    /// Proxy for `http://` targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_proxy: Option<String>,
    /// Proxy for `https://` targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_proxy: Option<String>,
    /// Hosts that bypass the proxy.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub no_proxy: Vec<String>,
    /// Proxy auth username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Proxy auth password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretString>,
}

/// Request retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    /// Maximum retry attempts.
    pub backoff_limit: u32,
    /// Initial backoff interval.
    pub backoff_interval_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff_limit: DEFAULT_RETRY_BACKOFF_LIMIT,
            backoff_interval_ms: DEFAULT_RETRY_BACKOFF_INTERVAL_MS,
        }
    }
}

/// Custom request headers. `Debug` redacts credential-bearing values.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomHeaders(BTreeMap<String, String>);

impl CustomHeaders {
    /// Insert or replace a header.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Look up a header value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Iterate headers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// True when no headers are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for CustomHeaders {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_map()
            .entries(
                self.0
                    .iter()
                    .map(|(name, value)| (name, redact_if_secret(name, value))),
            )
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CustomHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
