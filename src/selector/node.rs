//! Node abstraction.
//!
//! # Responsibilities
//! - Describe a backend service instance (name, version, endpoints, metadata)
//! - Expose typed metadata lookups (weight)
//! - Let integration adapters supply their own node wrappers

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata key holding a node's selection weight.
pub const WEIGHT_KEY: &str = "weight";

/// String-keyed service metadata as reported by discovery.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Read an integer value.
    ///
    /// Accepts JSON integers, floats with no fractional part, and strings that
    /// parse as integers. Anything else reads as `None`.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for Metadata {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

/// Service descriptor carried by every node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Service {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Service {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.push(endpoint.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Discovery key: `/<name>/<version>/<endpoints>`.
    pub fn key(&self) -> String {
        format!("/{}/{}/{}", self.name, self.version, self.endpoints.join(","))
    }
}

/// A single backend instance as seen by a selector.
///
/// Selectors never mutate nodes. Adapters implement this for their own
/// connection-carrying types.
pub trait Node: Send + Sync + fmt::Debug {
    fn service(&self) -> &Service;

    fn address(&self) -> &str;
}

/// Plain node: a service descriptor plus the address to dial.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceNode {
    service: Service,
    address: String,
}

impl ServiceNode {
    pub fn new(service: Service, address: impl Into<String>) -> Self {
        Self {
            service,
            address: address.into(),
        }
    }
}

impl Node for ServiceNode {
    fn service(&self) -> &Service {
        &self.service
    }

    fn address(&self) -> &str {
        &self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_int_coercions() {
        let mut md = Metadata::new();
        md.insert("int", 3);
        md.insert("float", 4.0);
        md.insert("frac", 4.5);
        md.insert("str", " 7 ");
        md.insert("junk", "seven");
        md.insert("flag", true);

        assert_eq!(md.get_int("int"), Some(3));
        assert_eq!(md.get_int("float"), Some(4));
        assert_eq!(md.get_int("frac"), None);
        assert_eq!(md.get_int("str"), Some(7));
        assert_eq!(md.get_int("junk"), None);
        assert_eq!(md.get_int("flag"), None);
        assert_eq!(md.get_int("missing"), None);
    }

    #[test]
    fn test_service_key() {
        let svc = Service::new("user", "v2")
            .with_endpoint("10.0.0.1:80")
            .with_endpoint("10.0.0.2:80");
        assert_eq!(svc.key(), "/user/v2/10.0.0.1:80,10.0.0.2:80");
    }

    #[test]
    fn test_service_deserializes_metadata() {
        let svc: Service = serde_json::from_value(json!({
            "name": "order",
            "version": "1.0.0",
            "metadata": { "weight": "5", "region": "us-east-1" }
        }))
        .unwrap();
        assert_eq!(svc.metadata.get_int(WEIGHT_KEY), Some(5));
        assert_eq!(svc.metadata.get_str("region"), Some("us-east-1"));
        assert!(svc.endpoints.is_empty());
    }
}
