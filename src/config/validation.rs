//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the strategy name against the builder registry
//! - Validate value ranges (picks > 0, concurrency > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SelectorConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::SelectorConfig;
use crate::selector::builder_by_name;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),

    #[error("node #{index} has an empty {field}")]
    EmptyNodeField { index: usize, field: &'static str },

    #[error("simulation.{0} must be greater than zero")]
    ZeroSimulationValue(&'static str),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

pub fn validate_config(config: &SelectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if builder_by_name(&config.strategy).is_none() {
        errors.push(ValidationError::UnknownStrategy(config.strategy.clone()));
    }

    for (index, node) in config.nodes.iter().enumerate() {
        if node.name.trim().is_empty() {
            errors.push(ValidationError::EmptyNodeField {
                index,
                field: "name",
            });
        }
        if node.address.trim().is_empty() {
            errors.push(ValidationError::EmptyNodeField {
                index,
                field: "address",
            });
        }
    }

    if config.simulation.picks == 0 {
        errors.push(ValidationError::ZeroSimulationValue("picks"));
    }
    if config.simulation.concurrency == 0 {
        errors.push(ValidationError::ZeroSimulationValue("concurrency"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
