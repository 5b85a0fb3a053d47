//! Shared utilities for integration tests.

use std::sync::Arc;

use node_selector::selector::{Node, Service, ServiceNode, WEIGHT_KEY};

/// A node named `name` listening on `<name>:8000`.
pub fn node(name: &str) -> Arc<dyn Node> {
    Arc::new(ServiceNode::new(
        Service::new(name, "1.0.0"),
        format!("{}:8000", name),
    ))
}

/// A node carrying a `weight` metadata entry.
#[allow(dead_code)]
pub fn weighted(name: &str, weight: i64) -> Arc<dyn Node> {
    Arc::new(ServiceNode::new(
        Service::new(name, "1.0.0").with_metadata(WEIGHT_KEY, weight),
        format!("{}:8000", name),
    ))
}

#[allow(dead_code)]
pub fn nodes(names: &[&str]) -> Vec<Arc<dyn Node>> {
    names.iter().map(|n| node(n)).collect()
}
