//! # cluster-overlay-config
//!
//! Overlay configuration for a secondary API surface on top of a base
//! cluster client configuration. A [`ResolvedConfig`] carries the base
//! connection settings plus a secondary API version, a normalized endpoint
//! URL, an operation timeout, and API-group flags. Defaults are derived
//! from override signals (properties, then environment) and the base
//! config's master URL.

/// Base cluster client configuration.
pub mod base;
/// Base/resolved document loading and serialization.
pub mod load;
/// Override signal sources (properties, environment, layers).
pub mod overrides;
/// Readiness strategy selection.
pub mod readiness;
/// Default derivation of version and endpoint.
pub mod resolve;
/// The resolved configuration value and its builder.
pub mod resolved;
/// URL joining and inspection helpers.
pub mod urls;
/// Base-or-resolved wrapping.
pub mod wrap;

pub use base::{
    BaseConfig, Credentials, CustomHeaders, DEFAULT_API_VERSION, DEFAULT_MASTER_URL,
    ProxySettings, RetryPolicy, Timeouts,
};
pub use load::{
    DocumentFormat, load_base_config_from_path, parse_base_config_json, parse_base_config_toml,
    parse_resolved_config_json, to_pretty_json,
};
pub use overrides::{
    EnvLookup, EnvOverrides, LayeredOverrides, OverrideSource, ProcessOverrides,
    PropertyOverrides, env_var_name, read_optional_override, read_override,
};
pub use readiness::{ClusterReadiness, ReadinessStrategy, SecondaryReadiness};
pub use resolve::{
    API_ROOT_SEGMENT, API_VERSION_OVERRIDE_KEY, DEFAULT_OPERATION_TIMEOUT,
    DEFAULT_OPERATION_TIMEOUT_MS, ENDPOINT_URL_OVERRIDE_KEY, OPERATION_TIMEOUT_OVERRIDE_KEY,
    derive_endpoint, normalize_endpoint, resolve_endpoint, resolve_version,
};
pub use resolved::{ResolvedConfig, ResolvedConfigBuilder};
pub use urls::{ensure_trailing_slash, is_root_url, join};
pub use wrap::{AnyConfig, wrap, wrap_with};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_overlay_shared::shared_crate_version;

    #[test]
    fn config_crate_compiles() {
        let version = config_crate_version();
        assert!(!version.is_empty());
        assert_eq!(version, shared_crate_version());
    }
}
