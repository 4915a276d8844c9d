//! Single entry point from "whatever config I have" to a resolved one.

use crate::base::BaseConfig;
use crate::overrides::{OverrideSource, ProcessOverrides};
use crate::resolved::ResolvedConfig;
use std::borrow::Cow;

/// Either a base configuration or one that is already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyConfig {
    /// Needs default derivation.
    Base(BaseConfig),
    /// Already resolved; passed through untouched.
    Resolved(ResolvedConfig),
}

impl AnyConfig {
    /// True for [`AnyConfig::Resolved`].
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Borrow a resolved config, or derive one from the base config.
    pub fn resolve_ref(&self, source: &dyn OverrideSource) -> Cow<'_, ResolvedConfig> {
        match self {
            Self::Resolved(config) => Cow::Borrowed(config),
            Self::Base(base) => Cow::Owned(ResolvedConfig::from_base(base.clone(), source)),
        }
    }
}

impl From<BaseConfig> for AnyConfig {
    fn from(base: BaseConfig) -> Self {
        Self::Base(base)
    }
}

impl From<ResolvedConfig> for AnyConfig {
    fn from(config: ResolvedConfig) -> Self {
        Self::Resolved(config)
    }
}

/// Resolve against process-wide overrides (properties unset, environment).
///
/// ```
/// use cluster_overlay_config::{BaseConfig, wrap};
///
/// let resolved = wrap(BaseConfig::for_master("https://cluster:8443"));
/// assert!(resolved.endpoint_url().ends_with('/'));
/// assert_eq!(wrap(resolved.clone()), resolved);
/// ```
pub fn wrap(config: impl Into<AnyConfig>) -> ResolvedConfig {
    wrap_with(config, &ProcessOverrides::from_std_env())
}

/// Resolve against an explicit override source.
pub fn wrap_with(config: impl Into<AnyConfig>, source: &dyn OverrideSource) -> ResolvedConfig {
    match config.into() {
        AnyConfig::Resolved(config) => config,
        AnyConfig::Base(base) => ResolvedConfig::from_base(base, source),
    }
}
