//! Readiness capability hook.
//!
//! Clients ask the configuration which readiness strategy applies to the
//! surface they talk to. Evaluating readiness of a live resource lives with
//! the client; this module only names the strategy and the kinds it covers.

use crate::base::BaseConfig;
use crate::resolved::ResolvedConfig;

/// Resource kinds with a readiness rule on the base cluster API.
const CLUSTER_KINDS: &[&str] = &[
    "Deployment",
    "Endpoints",
    "Ingress",
    "Node",
    "Pod",
    "ReplicaSet",
    "ReplicationController",
    "StatefulSet",
];

/// Kinds added by the secondary API surface.
const SECONDARY_KINDS: &[&str] = &["DeploymentConfig"];

/// Strategy selected by a configuration for readiness evaluation.
pub trait ReadinessStrategy: Send + Sync + std::fmt::Debug {
    /// Stable strategy name.
    fn name(&self) -> &'static str;

    /// Whether resources of `kind` have a readiness rule.
    fn supports_kind(&self, kind: &str) -> bool;
}

/// Readiness rules of the base cluster API.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterReadiness;

impl ReadinessStrategy for ClusterReadiness {
    fn name(&self) -> &'static str {
        "cluster"
    }

    fn supports_kind(&self, kind: &str) -> bool {
        CLUSTER_KINDS.contains(&kind)
    }
}

/// Cluster rules plus the secondary surface's own kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecondaryReadiness;

impl ReadinessStrategy for SecondaryReadiness {
    fn name(&self) -> &'static str {
        "secondary"
    }

    fn supports_kind(&self, kind: &str) -> bool {
        SECONDARY_KINDS.contains(&kind) || ClusterReadiness.supports_kind(kind)
    }
}

static CLUSTER_READINESS: ClusterReadiness = ClusterReadiness;
static SECONDARY_READINESS: SecondaryReadiness = SecondaryReadiness;

impl BaseConfig {
    /// Readiness strategy for the base cluster API.
    pub fn readiness(&self) -> &'static dyn ReadinessStrategy {
        &CLUSTER_READINESS
    }
}

impl ResolvedConfig {
    /// Readiness strategy for the secondary API surface.
    pub fn readiness(&self) -> &'static dyn ReadinessStrategy {
        &SECONDARY_READINESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_configs_select_secondary_strategy() {
        let resolved = ResolvedConfig::builder(BaseConfig::default()).build();
        let strategy = resolved.readiness();
        assert_eq!(strategy.name(), "secondary");
        assert!(strategy.supports_kind("DeploymentConfig"));
        assert!(strategy.supports_kind("Pod"));
        assert!(!strategy.supports_kind("ConfigMap"));
    }

    #[test]
    fn base_configs_select_cluster_strategy() {
        let base = BaseConfig::default();
        let strategy = base.readiness();
        assert_eq!(strategy.name(), "cluster");
        assert!(strategy.supports_kind("StatefulSet"));
        assert!(!strategy.supports_kind("DeploymentConfig"));
    }
}
