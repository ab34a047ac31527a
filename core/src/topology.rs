//! Topology Resolver
//!
//! Maps deployment units to the pipeline that built them, and service names to
//! their source repository. Lookups go through read-only directory traits so a
//! deployment can back them with a real service-discovery call; the resolver
//! itself never fails and degrades to the `unknown` sentinels instead.

use crate::config::{PipelineEntry, ServiceEntry, TopologyConfig};
use crate::models::{PipelineInfo, RepositoryInfo};
use std::sync::Arc;
use tracing::debug;

/// Read-only deployment unit → pipeline lookup
pub trait PipelineDirectory: Send + Sync {
    fn pipeline_for(&self, deployment_unit: &str) -> Option<PipelineInfo>;
}

/// Read-only service hint → repository lookup
pub trait RepositoryDirectory: Send + Sync {
    fn repository_for(&self, service_hint: &str) -> Option<RepositoryInfo>;
}

/// Table-backed directory built from [`TopologyConfig`]
#[derive(Debug, Clone, Default)]
pub struct StaticTopology {
    pipelines: Vec<PipelineEntry>,
    services: Vec<ServiceEntry>,
}

impl StaticTopology {
    pub fn new(config: &TopologyConfig) -> Self {
        Self {
            pipelines: config.pipelines.clone(),
            services: config.services.clone(),
        }
    }
}

impl PipelineDirectory for StaticTopology {
    fn pipeline_for(&self, deployment_unit: &str) -> Option<PipelineInfo> {
        self.pipelines
            .iter()
            .find(|entry| entry.deployment_unit == deployment_unit)
            .map(|entry| PipelineInfo {
                pipeline_id: entry.pipeline_id.clone(),
                pipeline_name: entry.pipeline_name.clone(),
                build_number: entry.build_number.clone(),
                repository: entry.repository.clone(),
                resolved: true,
            })
    }
}

impl RepositoryDirectory for StaticTopology {
    /// First service (in table order) contained in the lower-cased hint wins.
    fn repository_for(&self, service_hint: &str) -> Option<RepositoryInfo> {
        let hint = service_hint.to_lowercase();
        self.services
            .iter()
            .find(|entry| hint.contains(entry.service.as_str()))
            .map(|entry| RepositoryInfo {
                repository: entry.repository.clone(),
                branch: entry.branch.clone(),
                last_commit: entry.last_commit.clone(),
                resolved: true,
            })
    }
}

/// Total resolver over injected directories
#[derive(Clone)]
pub struct TopologyResolver {
    pipelines: Arc<dyn PipelineDirectory>,
    repositories: Arc<dyn RepositoryDirectory>,
}

impl Default for TopologyResolver {
    fn default() -> Self {
        Self::from_static(StaticTopology::new(&TopologyConfig::default()))
    }
}

impl TopologyResolver {
    pub fn new(
        pipelines: Arc<dyn PipelineDirectory>,
        repositories: Arc<dyn RepositoryDirectory>,
    ) -> Self {
        Self {
            pipelines,
            repositories,
        }
    }

    /// Use one static table for both lookups
    pub fn from_static(topology: StaticTopology) -> Self {
        let topology = Arc::new(topology);
        Self::new(topology.clone(), topology)
    }

    pub fn resolve_pipeline(&self, deployment_unit: &str) -> PipelineInfo {
        self.pipelines
            .pipeline_for(deployment_unit)
            .unwrap_or_else(|| {
                debug!("No pipeline registered for deployment unit '{}'", deployment_unit);
                PipelineInfo::unknown()
            })
    }

    pub fn resolve_repository(&self, service_hint: &str) -> RepositoryInfo {
        self.repositories
            .repository_for(service_hint)
            .unwrap_or_else(|| {
                debug!("No repository matches service hint '{}'", service_hint);
                RepositoryInfo::unknown()
            })
    }
}

impl std::fmt::Debug for TopologyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopologyResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_deployment_unit() {
        let resolver = TopologyResolver::default();
        let pipeline = resolver.resolve_pipeline("aks-nodepool1-12345");
        assert_eq!(pipeline.pipeline_name, "user-service-ci-cd");
        assert_eq!(pipeline.build_number, "234");
        assert!(pipeline.resolved);
    }

    #[test]
    fn test_unknown_deployment_unit_is_sentinel() {
        let resolver = TopologyResolver::default();
        for unit in ["aks-nodepool1-99999", "", "AKS-NODEPOOL1-12345"] {
            let pipeline = resolver.resolve_pipeline(unit);
            assert_eq!(pipeline, PipelineInfo::unknown());
            assert_eq!(pipeline.pipeline_id, "unknown");
            assert_eq!(pipeline.pipeline_name, "unknown-pipeline");
            assert_eq!(pipeline.build_number, "N/A");
            assert_eq!(pipeline.repository, "unknown/unknown");
            assert!(!pipeline.resolved);
        }
    }

    #[test]
    fn test_repository_substring_match() {
        let resolver = TopologyResolver::default();
        let repo = resolver.resolve_repository("Payment-Service-Prod");
        assert_eq!(repo.repository, "company/payment-service");
        assert_eq!(repo.branch, "main");
        assert_eq!(repo.last_commit, "abc123def456");
        assert!(repo.resolved);

        assert_eq!(resolver.resolve_repository("inventory"), RepositoryInfo::unknown());
        assert_eq!(resolver.resolve_repository(""), RepositoryInfo::unknown());
    }

    #[test]
    fn test_repository_ties_broken_by_table_order() {
        // Both services appear in the hint; declaration order decides, not position or length.
        let resolver = TopologyResolver::default();
        let repo = resolver.resolve_repository("order-service-calls-user-service");
        assert_eq!(repo.repository, "company/user-service");

        let config = TopologyConfig {
            pipelines: Vec::new(),
            services: vec![
                ServiceEntry {
                    service: "pay".to_string(),
                    repository: "acme/pay".to_string(),
                    branch: "main".to_string(),
                    last_commit: "1".to_string(),
                },
                ServiceEntry {
                    service: "payment-gateway".to_string(),
                    repository: "acme/payment-gateway".to_string(),
                    branch: "develop".to_string(),
                    last_commit: "2".to_string(),
                },
            ],
        };
        let resolver = TopologyResolver::from_static(StaticTopology::new(&config));
        assert_eq!(
            resolver.resolve_repository("payment-gateway-prod").repository,
            "acme/pay"
        );
    }

    struct FixedDirectory;

    impl PipelineDirectory for FixedDirectory {
        fn pipeline_for(&self, _deployment_unit: &str) -> Option<PipelineInfo> {
            Some(PipelineInfo {
                pipeline_id: "p".to_string(),
                pipeline_name: "discovered".to_string(),
                build_number: "1".to_string(),
                repository: "acme/discovered".to_string(),
                resolved: true,
            })
        }
    }

    impl RepositoryDirectory for FixedDirectory {
        fn repository_for(&self, _service_hint: &str) -> Option<RepositoryInfo> {
            None
        }
    }

    #[test]
    fn test_injected_directory() {
        let directory = Arc::new(FixedDirectory);
        let resolver = TopologyResolver::new(directory.clone(), directory);
        assert_eq!(resolver.resolve_pipeline("anything").pipeline_name, "discovered");
        assert_eq!(
            resolver.resolve_repository("user-service"),
            RepositoryInfo::unknown()
        );
    }
}
