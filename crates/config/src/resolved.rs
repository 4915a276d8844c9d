//! The resolved configuration for the secondary API surface.
//!
//! Every value goes through [`ResolvedConfigBuilder::build`], which enforces:
//! - `endpoint_url` is non-empty and ends with exactly one `/`
//! - `api_groups_enabled` forces `disable_api_group_check` to `false`
//! - `operation_timeout` has whole-millisecond precision, matching the wire
//!   field `operationTimeoutMs`
//!
//! Values are immutable; the `with_*` methods return a rebuilt copy.

use crate::base::BaseConfig;
use crate::overrides::OverrideSource;
use crate::resolve::{
    DEFAULT_OPERATION_TIMEOUT, normalize_endpoint, resolve_endpoint, resolve_version,
};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::time::Duration;

/// Base cluster settings plus the derived secondary API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ResolvedConfigDocument", from = "ResolvedConfigDocument")]
pub struct ResolvedConfig {
    base: BaseConfig,
    secondary_api_version: String,
    endpoint_url: String,
    operation_timeout: Duration,
    api_groups_enabled: bool,
    disable_api_group_check: bool,
}

impl ResolvedConfig {
    /// Derive everything from `base` and the override `source`.
    pub fn from_base(base: BaseConfig, source: &dyn OverrideSource) -> Self {
        let version = resolve_version(&base, source);
        let endpoint = resolve_endpoint(&base, source, &version);
        Self::builder(base)
            .secondary_api_version(version)
            .endpoint_url(endpoint)
            .build()
    }

    /// Use an explicit endpoint; the version is still derived.
    pub fn with_endpoint(
        base: BaseConfig,
        endpoint_url: impl Into<String>,
        source: &dyn OverrideSource,
    ) -> Self {
        let version = resolve_version(&base, source);
        Self::builder(base)
            .secondary_api_version(version)
            .endpoint_url(endpoint_url)
            .build()
    }

    /// Explicit construction; nothing is read from override sources.
    pub fn builder(base: BaseConfig) -> ResolvedConfigBuilder {
        ResolvedConfigBuilder::new(base)
    }

    /// Builder seeded with every field of `self`.
    pub fn to_builder(&self) -> ResolvedConfigBuilder {
        self.clone().into_builder()
    }

    /// Consuming variant of [`Self::to_builder`].
    pub fn into_builder(self) -> ResolvedConfigBuilder {
        ResolvedConfigBuilder {
            base: self.base,
            secondary_api_version: Some(self.secondary_api_version),
            endpoint_url: Some(self.endpoint_url),
            operation_timeout: Some(self.operation_timeout),
            api_groups_enabled: self.api_groups_enabled,
            disable_api_group_check: self.disable_api_group_check,
        }
    }

    /// Secondary API version (e.g. `v1`).
    pub fn secondary_api_version(&self) -> &str {
        &self.secondary_api_version
    }

    /// Secondary API endpoint, always ending in `/`.
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Timeout for long-running operations on the secondary surface.
    pub const fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Whether grouped API resources are exposed.
    pub const fn api_groups_enabled(&self) -> bool {
        self.api_groups_enabled
    }

    /// Whether API group capability detection is skipped.
    pub const fn disable_api_group_check(&self) -> bool {
        self.disable_api_group_check
    }

    /// Embedded base configuration.
    pub const fn base(&self) -> &BaseConfig {
        &self.base
    }

    /// Consume and return the base configuration.
    pub fn into_base(self) -> BaseConfig {
        self.base
    }

    /// Copy with a different secondary API version. The endpoint is kept.
    #[must_use]
    pub fn with_secondary_api_version(self, version: impl Into<String>) -> Self {
        self.into_builder().secondary_api_version(version).build()
    }

    /// Copy with a different endpoint (normalized).
    #[must_use]
    pub fn with_endpoint_url(self, endpoint_url: impl Into<String>) -> Self {
        self.into_builder().endpoint_url(endpoint_url).build()
    }

    /// Copy with a different operation timeout.
    #[must_use]
    pub fn with_operation_timeout(self, timeout: Duration) -> Self {
        self.into_builder().operation_timeout(timeout).build()
    }

    /// Copy with grouped APIs toggled; enabling them re-enables the group check.
    #[must_use]
    pub fn with_api_groups_enabled(self, enabled: bool) -> Self {
        self.into_builder().api_groups_enabled(enabled).build()
    }

    /// Copy with the group check toggled. Ignored while grouped APIs are enabled.
    #[must_use]
    pub fn with_disable_api_group_check(self, disable: bool) -> Self {
        self.into_builder().disable_api_group_check(disable).build()
    }
}

impl Deref for ResolvedConfig {
    type Target = BaseConfig;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl AsRef<BaseConfig> for ResolvedConfig {
    fn as_ref(&self) -> &BaseConfig {
        &self.base
    }
}

/// Staged construction of a [`ResolvedConfig`].
///
/// Setters only record values; defaults and invariants are applied in
/// [`Self::build`], so intermediate states are never observable.
#[derive(Debug, Clone)]
pub struct ResolvedConfigBuilder {
    base: BaseConfig,
    secondary_api_version: Option<String>,
    endpoint_url: Option<String>,
    operation_timeout: Option<Duration>,
    api_groups_enabled: bool,
    disable_api_group_check: bool,
}

impl ResolvedConfigBuilder {
    /// Start from `base` with every secondary field unset.
    pub const fn new(base: BaseConfig) -> Self {
        Self {
            base,
            secondary_api_version: None,
            endpoint_url: None,
            operation_timeout: None,
            api_groups_enabled: false,
            disable_api_group_check: false,
        }
    }

    /// Replace the base configuration.
    #[must_use]
    pub fn base(mut self, base: BaseConfig) -> Self {
        self.base = base;
        self
    }

    /// Secondary API version; defaults to the base API version.
    #[must_use]
    pub fn secondary_api_version(mut self, version: impl Into<String>) -> Self {
        self.secondary_api_version = Some(version.into());
        self
    }

    /// Secondary endpoint; defaults to `<master>/oapi/<version>/`.
    #[must_use]
    pub fn endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Operation timeout; defaults to five minutes. Truncated to whole
    /// milliseconds on build.
    #[must_use]
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Expose grouped API resources.
    #[must_use]
    pub fn api_groups_enabled(mut self, enabled: bool) -> Self {
        self.api_groups_enabled = enabled;
        self
    }

    /// Request that API group detection be skipped.
    #[must_use]
    pub fn disable_api_group_check(mut self, disable: bool) -> Self {
        self.disable_api_group_check = disable;
        self
    }

    /// Apply defaults and invariants.
    pub fn build(self) -> ResolvedConfig {
        let secondary_api_version = self
            .secondary_api_version
            .map(|version| version.trim().to_owned())
            .filter(|version| !version.is_empty())
            .unwrap_or_else(|| self.base.api_version.clone());
        let endpoint_url =
            normalize_endpoint(&self.base, self.endpoint_url, &secondary_api_version);

        // Grouped APIs always run the capability check.
        let disable_api_group_check = !self.api_groups_enabled && self.disable_api_group_check;

        ResolvedConfig {
            base: self.base,
            secondary_api_version,
            endpoint_url,
            operation_timeout: Duration::from_millis(duration_millis(
                self.operation_timeout.unwrap_or(DEFAULT_OPERATION_TIMEOUT),
            )),
            api_groups_enabled: self.api_groups_enabled,
            disable_api_group_check,
        }
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Wire shape: base fields flattened next to the secondary fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedConfigDocument {
    #[serde(flatten)]
    base: BaseConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secondary_api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    endpoint_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operation_timeout_ms: Option<u64>,
    #[serde(default)]
    api_groups_enabled: bool,
    #[serde(default)]
    disable_api_group_check: bool,
}

impl From<ResolvedConfig> for ResolvedConfigDocument {
    fn from(config: ResolvedConfig) -> Self {
        let operation_timeout_ms = duration_millis(config.operation_timeout);
        Self {
            base: config.base,
            secondary_api_version: Some(config.secondary_api_version),
            endpoint_url: Some(config.endpoint_url),
            operation_timeout_ms: Some(operation_timeout_ms),
            api_groups_enabled: config.api_groups_enabled,
            disable_api_group_check: config.disable_api_group_check,
        }
    }
}

impl From<ResolvedConfigDocument> for ResolvedConfig {
    fn from(document: ResolvedConfigDocument) -> Self {
        let mut builder = ResolvedConfigBuilder::new(document.base)
            .api_groups_enabled(document.api_groups_enabled)
            .disable_api_group_check(document.disable_api_group_check);
        if let Some(version) = document.secondary_api_version {
            builder = builder.secondary_api_version(version);
        }
        if let Some(endpoint_url) = document.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }
        if let Some(timeout_ms) = document.operation_timeout_ms {
            builder = builder.operation_timeout(Duration::from_millis(timeout_ms));
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::PropertyOverrides;
    use crate::resolve::{API_VERSION_OVERRIDE_KEY, ENDPOINT_URL_OVERRIDE_KEY};
    use proptest::prelude::*;
    use std::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cluster() -> BaseConfig {
        BaseConfig::for_master("http://cluster:8443")
    }

    /// Answers `v1`, `v2`, ... on successive version lookups.
    #[derive(Default)]
    struct ShiftingVersion {
        reads: AtomicUsize,
    }

    impl OverrideSource for ShiftingVersion {
        fn lookup(&self, key: &str) -> Option<String> {
            if key != API_VERSION_OVERRIDE_KEY {
                return None;
            }
            let read = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
            Some(format!("v{read}"))
        }
    }

    #[test]
    fn version_override_is_read_once_per_resolution() {
        let source = ShiftingVersion::default();
        let config = ResolvedConfig::from_base(cluster(), &source);

        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
        assert_eq!(config.secondary_api_version(), "v1");
        assert_eq!(config.endpoint_url(), "http://cluster:8443/oapi/v1/");

        let pinned = ResolvedConfig::with_endpoint(cluster(), "http://pinned/", &source);
        assert_eq!(source.reads.load(Ordering::SeqCst), 2);
        assert_eq!(pinned.secondary_api_version(), "v2");
    }

    #[test]
    fn repeated_trailing_slashes_collapse() {
        let config = ResolvedConfig::builder(cluster())
            .endpoint_url("http://x/y//")
            .build();
        assert_eq!(config.endpoint_url(), "http://x/y/");

        let source = PropertyOverrides::new()
            .with(ENDPOINT_URL_OVERRIDE_KEY, "http://alt/custom/path//");
        let config = ResolvedConfig::from_base(cluster(), &source);
        assert_eq!(config.endpoint_url(), "http://alt/custom/path/");
    }

    #[test]
    fn sub_millisecond_timeouts_are_truncated() -> Result<(), Box<dyn Error>> {
        let config = ResolvedConfig::builder(cluster())
            .operation_timeout(Duration::from_micros(1_500))
            .build();
        assert_eq!(config.operation_timeout(), Duration::from_millis(1));

        let json = serde_json::to_string(&config)?;
        let reparsed: ResolvedConfig = serde_json::from_str(&json)?;
        assert_eq!(reparsed, config);
        Ok(())
    }

    #[test]
    fn from_base_derives_endpoint_from_master() {
        let config = ResolvedConfig::from_base(cluster(), &PropertyOverrides::new());
        assert_eq!(config.endpoint_url(), "http://cluster:8443/oapi/v1/");
        assert_eq!(config.secondary_api_version(), "v1");
        assert_eq!(config.operation_timeout(), DEFAULT_OPERATION_TIMEOUT);
        assert!(!config.api_groups_enabled());
        assert!(!config.disable_api_group_check());
    }

    #[test]
    fn from_base_applies_overrides() {
        let source = PropertyOverrides::new()
            .with(ENDPOINT_URL_OVERRIDE_KEY, "http://alt-host")
            .with(API_VERSION_OVERRIDE_KEY, "v2");
        let config = ResolvedConfig::from_base(cluster(), &source);
        assert_eq!(config.endpoint_url(), "http://alt-host/oapi/v2/");
        assert_eq!(config.secondary_api_version(), "v2");
    }

    #[test]
    fn explicit_endpoint_is_normalized() {
        let config = ResolvedConfig::with_endpoint(
            cluster(),
            "https://secondary.example.com/apis",
            &PropertyOverrides::new(),
        );
        assert_eq!(config.endpoint_url(), "https://secondary.example.com/apis/");
    }

    #[test]
    fn explicit_empty_endpoint_is_rederived() {
        let source = PropertyOverrides::new().with(API_VERSION_OVERRIDE_KEY, "v3");
        let config = ResolvedConfig::with_endpoint(cluster(), "", &source);
        assert_eq!(config.endpoint_url(), "http://cluster:8443/oapi/v3/");
    }

    #[test]
    fn builder_defaults_version_to_base() {
        let mut base = cluster();
        base.api_version = "v1beta1".to_owned();
        let config = ResolvedConfig::builder(base).build();
        assert_eq!(config.secondary_api_version(), "v1beta1");
        assert_eq!(config.endpoint_url(), "http://cluster:8443/oapi/v1beta1/");
    }

    #[test]
    fn base_fields_are_reachable_through_deref() {
        let mut base = cluster();
        base.namespace = Some("team-a".to_owned());
        let config = ResolvedConfig::builder(base.clone()).build();
        assert_eq!(config.master_url, "http://cluster:8443");
        assert_eq!(config.namespace.as_deref(), Some("team-a"));
        assert_eq!(config.base(), &base);
        assert_eq!(config.into_base(), base);
    }

    #[test]
    fn enabling_groups_forces_group_check_on() {
        let config = ResolvedConfig::builder(cluster())
            .disable_api_group_check(true)
            .build();
        assert!(config.disable_api_group_check());

        let config = config.with_api_groups_enabled(true);
        assert!(config.api_groups_enabled());
        assert!(!config.disable_api_group_check());

        let config = config.with_disable_api_group_check(true);
        assert!(!config.disable_api_group_check());
    }

    #[test]
    fn copies_keep_untouched_fields() {
        let config = ResolvedConfig::from_base(cluster(), &PropertyOverrides::new())
            .with_operation_timeout(Duration::from_secs(30));
        let updated = config.clone().with_secondary_api_version("v2");

        assert_eq!(updated.secondary_api_version(), "v2");
        assert_eq!(updated.endpoint_url(), config.endpoint_url());
        assert_eq!(updated.operation_timeout(), Duration::from_secs(30));

        let moved = updated.with_endpoint_url("http://elsewhere/oapi/v2");
        assert_eq!(moved.endpoint_url(), "http://elsewhere/oapi/v2/");
    }

    #[test]
    fn to_builder_round_trips() {
        let config = ResolvedConfig::builder(cluster())
            .api_groups_enabled(true)
            .operation_timeout(Duration::from_millis(1_500))
            .build();
        assert_eq!(config.to_builder().build(), config);
    }

    proptest! {
        #[test]
        fn group_flag_truth_table_holds(enabled in any::<bool>(), disable in any::<bool>()) {
            let config = ResolvedConfig::builder(cluster())
                .api_groups_enabled(enabled)
                .disable_api_group_check(disable)
                .build();
            let expected = if enabled { false } else { disable };
            prop_assert_eq!(config.disable_api_group_check(), expected);

            let toggled = config.with_api_groups_enabled(!enabled);
            if toggled.api_groups_enabled() {
                prop_assert!(!toggled.disable_api_group_check());
            }
        }

        #[test]
        fn endpoint_always_ends_with_single_slash(
            host in "[a-z]{1,10}",
            port in 1u16..=u16::MAX,
            version in "v[0-9]{1,2}(beta[0-9])?",
            trailing in "/{0,3}",
            endpoint_slashes in "/{0,3}",
        ) {
            let base = BaseConfig {
                master_url: format!("https://{host}:{port}{trailing}"),
                api_version: version.clone(),
                ..BaseConfig::default()
            };
            let config = ResolvedConfig::from_base(base, &PropertyOverrides::new());
            let endpoint = config.endpoint_url();
            prop_assert!(endpoint.ends_with('/'));
            prop_assert!(!endpoint.ends_with("//"));
            prop_assert_eq!(
                endpoint,
                format!("https://{host}:{port}/oapi/{version}/")
            );

            let explicit = config
                .clone()
                .with_endpoint_url(format!("https://{host}/custom{endpoint_slashes}"));
            prop_assert_eq!(explicit.endpoint_url(), format!("https://{host}/custom/"));
        }
    }
}
