//! Weighted random selection strategy.
//!
//! `update` expands every node into `weight` copies; `pick` is then a uniform
//! random pick over the expanded set, so selection probability is
//! proportional to weight.
//!
//! Weight comes from the `weight` metadata key. Nodes without a readable
//! weight get `default_weight`, which is 0 unless configured otherwise, so
//! they are never picked. Negative weights count as 0 and weights above
//! [`MAX_WEIGHT`] count as `MAX_WEIGHT`, so a bad metadata entry cannot blow
//! up the expanded set.

use std::sync::{Arc, PoisonError, RwLock};

use crate::observability::metrics::{self, PickOutcome};
use crate::selector::random::pick_uniform;
use crate::selector::{Builder, Node, PickContext, Picked, Selector, SelectorError, WEIGHT_KEY};

pub const NAME: &str = "weight";

/// Largest number of slots a single node can take in the expanded set.
pub const MAX_WEIGHT: usize = 10_000;

#[derive(Debug, Default, Clone, Copy)]
pub struct WeightBuilder {
    default_weight: u32,
}

impl WeightBuilder {
    /// Builder whose selectors give weightless nodes `default_weight` copies.
    pub fn with_default_weight(default_weight: u32) -> Self {
        Self { default_weight }
    }

    pub fn default_weight(&self) -> u32 {
        self.default_weight
    }
}

impl Builder for WeightBuilder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn build(&self) -> Box<dyn Selector> {
        Box::new(WeightSelector::with_default_weight(self.default_weight))
    }
}

#[derive(Debug, Default)]
pub struct WeightSelector {
    default_weight: u32,
    nodes: RwLock<Vec<Arc<dyn Node>>>,
}

impl WeightSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_weight(default_weight: u32) -> Self {
        Self {
            default_weight,
            nodes: RwLock::default(),
        }
    }

    fn weight_of(&self, node: &dyn Node) -> usize {
        let weight = match node.service().metadata.get_int(WEIGHT_KEY) {
            Some(w) if w <= 0 => 0,
            Some(w) => usize::try_from(w).unwrap_or(MAX_WEIGHT),
            None => usize::try_from(self.default_weight).unwrap_or(MAX_WEIGHT),
        };
        weight.min(MAX_WEIGHT)
    }
}

impl Selector for WeightSelector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn pick(&self, _ctx: &PickContext) -> Result<Option<Picked>, SelectorError> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        match pick_uniform(&nodes) {
            Some(node) => {
                metrics::record_pick(NAME, PickOutcome::Hit);
                Ok(Some(Picked { node, done: None }))
            }
            None => {
                metrics::record_pick(NAME, PickOutcome::Empty);
                tracing::debug!(strategy = NAME, "No weighted node available");
                Ok(None)
            }
        }
    }

    fn update(&self, _ctx: &PickContext, nodes: Vec<Arc<dyn Node>>) -> Result<(), SelectorError> {
        let total = nodes
            .iter()
            .map(|n| self.weight_of(n.as_ref()))
            .fold(0usize, usize::saturating_add);
        let mut expanded = Vec::with_capacity(total);
        for node in &nodes {
            let weight = self.weight_of(node.as_ref());
            expanded.extend(std::iter::repeat(node).take(weight).cloned());
        }

        *self.nodes.write().unwrap_or_else(PoisonError::into_inner) = expanded;
        metrics::record_update(NAME, total);
        tracing::debug!(
            strategy = NAME,
            nodes = nodes.len(),
            total_weight = total,
            "Selector nodes updated"
        );
        Ok(())
    }

    fn len(&self) -> usize {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
