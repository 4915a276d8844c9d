//! Default derivation of the secondary API version and endpoint.
//!
//! Precedence (highest wins):
//! - explicit values passed to the builder
//! - override signals ([`ENDPOINT_URL_OVERRIDE_KEY`], [`API_VERSION_OVERRIDE_KEY`])
//! - values derived from the base config's master URL and API version

use crate::base::BaseConfig;
use crate::overrides::{OverrideSource, read_optional_override, read_override};
use crate::urls::{ensure_trailing_slash, is_root_url, join};
use std::time::Duration;

/// Override key for the secondary API version.
pub const API_VERSION_OVERRIDE_KEY: &str = "kubernetes.oapi.version";
/// Override key for the secondary endpoint URL.
pub const ENDPOINT_URL_OVERRIDE_KEY: &str = "openshift.url";
/// Override key reserved for the operation timeout. Resolution does not read it.
pub const OPERATION_TIMEOUT_OVERRIDE_KEY: &str = "openshift.build.timeout";

/// Path segment of the secondary API root under the master URL.
pub const API_ROOT_SEGMENT: &str = "oapi";

/// Default operation timeout in milliseconds.
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 5 * 60 * 1000;
/// Default operation timeout.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS);

/// Secondary API version: override, else the base config's API version.
pub fn resolve_version(base: &BaseConfig, source: &dyn OverrideSource) -> String {
    read_override(source, API_VERSION_OVERRIDE_KEY, &base.api_version)
}

/// Secondary endpoint URL before normalization.
///
/// `version` is the already resolved secondary version; the version override
/// is not read again. A root override URL (host, no path) gets the API root
/// and version appended; any other override is taken verbatim. Without an
/// override the endpoint hangs off the master URL.
pub fn resolve_endpoint(base: &BaseConfig, source: &dyn OverrideSource, version: &str) -> String {
    match read_optional_override(source, ENDPOINT_URL_OVERRIDE_KEY) {
        Some(url) if is_root_url(&url) => {
            tracing::debug!(
                key = ENDPOINT_URL_OVERRIDE_KEY,
                url = %url,
                version = %version,
                "endpoint override is a root url; appending api root"
            );
            derive_endpoint(&url, version)
        },
        Some(url) => {
            tracing::debug!(
                key = ENDPOINT_URL_OVERRIDE_KEY,
                url = %url,
                "using endpoint override verbatim"
            );
            url
        },
        None => {
            tracing::debug!(
                master_url = %base.master_url,
                version = %version,
                "deriving endpoint from master url"
            );
            derive_endpoint(&base.master_url, version)
        },
    }
}

/// `<root>/oapi/<version>`.
pub fn derive_endpoint(root: &str, version: &str) -> String {
    join(root, &[API_ROOT_SEGMENT, version])
}

/// Enforce the endpoint invariant: non-empty and ending in exactly one `/`.
///
/// A blank endpoint is re-derived from the master URL and `version`.
pub fn normalize_endpoint(base: &BaseConfig, endpoint: Option<String>, version: &str) -> String {
    let endpoint = endpoint
        .map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| derive_endpoint(&base.master_url, version));
    ensure_trailing_slash(endpoint)
}
