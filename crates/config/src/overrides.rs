//! Process-wide override signals.
//!
//! An override is a named value (`openshift.url`, `kubernetes.oapi.version`)
//! that takes precedence over a derived default. Sources are consulted on
//! every read and never cached, so a change between two resolutions is
//! picked up by the second one.
//!
//! Lookup order for [`ProcessOverrides`]:
//! - in-process properties ([`PropertyOverrides`])
//! - environment variables ([`EnvOverrides`], key `a.b-c` read as `A_B_C`)

use std::collections::BTreeMap;

/// A source of named override values.
pub trait OverrideSource: Send + Sync {
    /// Raw value for `key`, if the source defines one.
    fn lookup(&self, key: &str) -> Option<String>;
}

impl<T: OverrideSource + ?Sized> OverrideSource for &T {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

/// Read `key` from `source`, trimmed; blank values count as absent.
pub fn read_optional_override(source: &dyn OverrideSource, key: &str) -> Option<String> {
    let raw = source.lookup(key)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_owned())
}

/// Read `key` from `source`, falling back to `fallback` when absent or blank.
pub fn read_override(source: &dyn OverrideSource, key: &str, fallback: &str) -> String {
    read_optional_override(source, key).unwrap_or_else(|| fallback.to_owned())
}

/// Environment variable name for an override key.
///
/// ```
/// use cluster_overlay_config::env_var_name;
///
/// assert_eq!(env_var_name("openshift.url"), "OPENSHIFT_URL");
/// assert_eq!(env_var_name("kubernetes.oapi.version"), "KUBERNETES_OAPI_VERSION");
/// ```
pub fn env_var_name(key: &str) -> String {
    key.chars()
        .map(|ch| match ch {
            '.' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

/// Explicit key/value overrides held in memory.
///
/// Plays the role of process properties set by the host application, and is
/// the deterministic source used in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyOverrides {
    values: BTreeMap<String, String>,
}

impl PropertyOverrides {
    /// Empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an existing map.
    pub const fn from_map(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a property.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove a property.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

impl OverrideSource for PropertyOverrides {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyOverrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_map(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Environment-variable lookup function.
pub type EnvLookup = fn(&str) -> Option<String>;

fn std_env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Overrides read from environment variables at lookup time.
#[derive(Debug, Clone, Copy)]
pub struct EnvOverrides {
    lookup: EnvLookup,
}

impl EnvOverrides {
    /// Read from the process environment.
    pub const fn from_std_env() -> Self {
        Self {
            lookup: std_env_lookup,
        }
    }

    /// Read through a custom lookup (tests, sandboxed hosts).
    pub const fn with_lookup(lookup: EnvLookup) -> Self {
        Self { lookup }
    }
}

impl Default for EnvOverrides {
    fn default() -> Self {
        Self::from_std_env()
    }
}

impl OverrideSource for EnvOverrides {
    fn lookup(&self, key: &str) -> Option<String> {
        (self.lookup)(&env_var_name(key))
    }
}

/// Ordered stack of sources; the first non-blank value wins.
#[derive(Default)]
pub struct LayeredOverrides {
    layers: Vec<Box<dyn OverrideSource>>,
}

impl LayeredOverrides {
    /// Empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-precedence layer.
    #[must_use]
    pub fn then(mut self, layer: impl OverrideSource + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True when there are no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl OverrideSource for LayeredOverrides {
    fn lookup(&self, key: &str) -> Option<String> {
        self.layers
            .iter()
            .filter_map(|layer| layer.lookup(key))
            .find(|value| !value.trim().is_empty())
    }
}

impl std::fmt::Debug for LayeredOverrides {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("LayeredOverrides")
            .field("layers", &self.layers.len())
            .finish()
    }
}

/// Default process-wide source: properties, then environment.
#[derive(Debug, Clone, Default)]
pub struct ProcessOverrides {
    properties: PropertyOverrides,
    env: EnvOverrides,
}

impl ProcessOverrides {
    /// No properties; environment only.
    pub fn from_std_env() -> Self {
        Self::default()
    }

    /// Properties layered over the process environment.
    pub fn with_properties(properties: PropertyOverrides) -> Self {
        Self {
            properties,
            env: EnvOverrides::from_std_env(),
        }
    }

    /// Properties layered over a custom environment lookup.
    pub const fn new(properties: PropertyOverrides, env: EnvOverrides) -> Self {
        Self { properties, env }
    }
}

impl OverrideSource for ProcessOverrides {
    fn lookup(&self, key: &str) -> Option<String> {
        self.properties
            .lookup(key)
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.env.lookup(key))
    }
}
