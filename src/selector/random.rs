//! Random selection strategy.

use std::sync::{Arc, PoisonError, RwLock};

use rand::Rng;

use crate::observability::metrics::{self, PickOutcome};
use crate::selector::{Builder, Node, PickContext, Picked, Selector, SelectorError};

pub const NAME: &str = "random";

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomBuilder;

impl Builder for RandomBuilder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn build(&self) -> Box<dyn Selector> {
        Box::new(RandomSelector::new())
    }
}

/// Uniform random selector. Keeps no per-node state.
#[derive(Debug, Default)]
pub struct RandomSelector {
    nodes: RwLock<Vec<Arc<dyn Node>>>,
}

impl RandomSelector {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Pick a uniformly random element. Shared with the weighted strategy.
pub(crate) fn pick_uniform(nodes: &[Arc<dyn Node>]) -> Option<Arc<dyn Node>> {
    if nodes.is_empty() {
        return None;
    }
    let index = rand::thread_rng().gen_range(0..nodes.len());
    Some(nodes[index].clone())
}

impl Selector for RandomSelector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn pick(&self, _ctx: &PickContext) -> Result<Option<Picked>, SelectorError> {
        // The set is swapped wholesale, so a poisoned guard still holds a whole set.
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        match pick_uniform(&nodes) {
            Some(node) => {
                metrics::record_pick(NAME, PickOutcome::Hit);
                Ok(Some(Picked { node, done: None }))
            }
            None => {
                metrics::record_pick(NAME, PickOutcome::Empty);
                tracing::debug!(strategy = NAME, "No node available");
                Ok(None)
            }
        }
    }

    fn update(&self, _ctx: &PickContext, nodes: Vec<Arc<dyn Node>>) -> Result<(), SelectorError> {
        let count = nodes.len();
        *self.nodes.write().unwrap_or_else(PoisonError::into_inner) = nodes;
        metrics::record_update(NAME, count);
        tracing::debug!(strategy = NAME, nodes = count, "Selector nodes updated");
        Ok(())
    }

    fn len(&self) -> usize {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::testing::{nodes, picked_name};
    use std::collections::HashMap;

    #[test]
    fn test_random_frequencies_converge() {
        let selector = RandomSelector::new();
        selector
            .update(&PickContext::new(), nodes(&["a", "b", "c"]))
            .unwrap();

        let total = 60_000;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..total {
            *counts.entry(picked_name(&selector)).or_default() += 1;
        }

        assert_eq!(counts.len(), 3);
        let expected = total / 3;
        for (name, count) in counts {
            let diff = count.abs_diff(expected);
            assert!(diff < expected / 20, "{} picked {} times", name, count);
        }
    }

    #[test]
    fn test_random_single_node() {
        let selector = RandomSelector::new();
        selector.update(&PickContext::new(), nodes(&["only"])).unwrap();
        for _ in 0..10 {
            assert_eq!(picked_name(&selector), "only");
        }
        assert_eq!(selector.len(), 1);
    }
}
