//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files, and
//! every field has a default so an empty file is a valid config.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::selector::{
    builder_by_name, Node, SelectorError, Service, ServiceNode, SharedBuilder, WeightBuilder,
};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Strategy name (`random`, `weight`, `round-robin`, `least-connection`).
    pub strategy: String,

    /// Weighted strategy settings.
    pub weight: WeightConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Simulation run settings.
    pub simulation: SimulationConfig,

    /// Static node list fed to `update`.
    pub nodes: Vec<NodeConfig>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            strategy: "round-robin".to_string(),
            weight: WeightConfig::default(),
            observability: ObservabilityConfig::default(),
            simulation: SimulationConfig::default(),
            nodes: Vec::new(),
        }
    }
}

impl SelectorConfig {
    /// Builder for the configured strategy.
    pub fn builder(&self) -> Result<SharedBuilder, SelectorError> {
        if self.strategy == crate::selector::weight::NAME {
            return Ok(Arc::new(WeightBuilder::with_default_weight(
                self.weight.default_weight,
            )));
        }
        builder_by_name(&self.strategy)
            .ok_or_else(|| SelectorError::UnknownStrategy(self.strategy.clone()))
    }

    /// Nodes in declaration order.
    pub fn to_nodes(&self) -> Vec<Arc<dyn Node>> {
        self.nodes.iter().map(NodeConfig::to_node).collect()
    }
}

/// Weighted strategy configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WeightConfig {
    /// Weight for nodes without a `weight` metadata entry (default: 0, never picked).
    pub default_weight: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Level used when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Scrape listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Simulation run configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Total picks across all workers.
    pub picks: usize,

    /// Number of concurrent workers.
    pub concurrency: usize,

    /// Upper bound of the simulated call duration in milliseconds.
    pub hold_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            picks: 10_000,
            concurrency: 8,
            hold_ms: 2,
        }
    }
}

/// One backend instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
    /// Service name.
    pub name: String,

    #[serde(default)]
    pub version: String,

    /// Address to dial (e.g., "10.0.0.1:8000").
    pub address: String,

    /// Service metadata; `weight` drives the weighted strategy.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl NodeConfig {
    pub fn to_node(&self) -> Arc<dyn Node> {
        let service = Service {
            name: self.name.clone(),
            version: self.version.clone(),
            endpoints: vec![self.address.clone()],
            metadata: self.metadata.clone().into(),
        };
        Arc::new(ServiceNode::new(service, self.address.clone()))
    }
}
