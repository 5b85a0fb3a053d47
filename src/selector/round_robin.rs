//! Round-robin selection strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::observability::metrics::{self, PickOutcome};
use crate::selector::{Builder, Node, PickContext, Picked, Selector, SelectorError};

pub const NAME: &str = "round-robin";

#[derive(Debug, Default, Clone, Copy)]
pub struct RoundRobinBuilder;

impl Builder for RoundRobinBuilder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn build(&self) -> Box<dyn Selector> {
        Box::new(RoundRobinSelector::new())
    }
}

/// Round-robin selector.
/// Rotates a cursor through the current nodes in slice order.
///
/// The cursor survives `update`; it is taken modulo the current length on
/// every pick, so a shrunken set never sees an out-of-range index.
#[derive(Debug, Default)]
pub struct RoundRobinSelector {
    nodes: RwLock<Vec<Arc<dyn Node>>>,
    next: AtomicUsize,
}

impl RoundRobinSelector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Selector for RoundRobinSelector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn pick(&self, _ctx: &PickContext) -> Result<Option<Picked>, SelectorError> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        let len = nodes.len();
        if len == 0 {
            metrics::record_pick(NAME, PickOutcome::Empty);
            tracing::debug!(strategy = NAME, "No node available");
            return Ok(None);
        }

        // Length is fixed while the read guard is held, so the advance is a
        // single atomic step and concurrent picks never share a slot.
        let prev = self
            .next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some((n % len + 1) % len))
            .unwrap_or_else(|n| n);
        let node = nodes[prev % len].clone();

        metrics::record_pick(NAME, PickOutcome::Hit);
        Ok(Some(Picked { node, done: None }))
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

    #[test]
    fn test_round_robin() {
        let lb = RoundRobinSelector::new();
        lb.update(&PickContext::new(), nodes(&["a", "b", "c"]))
            .unwrap();

        assert_eq!(picked_name(&lb), "a");
        assert_eq!(picked_name(&lb), "b");
        assert_eq!(picked_name(&lb), "c");
        assert_eq!(picked_name(&lb), "a");
    }

    #[test]
    fn test_each_window_covers_every_node() {
        let lb = RoundRobinSelector::new();
        lb.update(&PickContext::new(), nodes(&["a", "b", "c", "d"]))
            .unwrap();

        // Start mid-cycle.
        picked_name(&lb);
        let mut window: Vec<String> = (0..4).map(|_| picked_name(&lb)).collect();
        assert_eq!(window, vec!["b", "c", "d", "a"]);
        window.sort();
        assert_eq!(window, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_cursor_survives_update() {
        let lb = RoundRobinSelector::new();
        let ctx = PickContext::new();
        lb.update(&ctx, nodes(&["a", "b", "c"])).unwrap();
        picked_name(&lb);

        lb.update(&ctx, nodes(&["x", "y", "z"])).unwrap();
        assert_eq!(picked_name(&lb), "y");
    }

    #[test]
    fn test_shrink_wraps_cursor() {
        let lb = RoundRobinSelector::new();
        let ctx = PickContext::new();
        lb.update(&ctx, nodes(&["a", "b", "c", "d", "e"])).unwrap();
        for _ in 0..4 {
            picked_name(&lb);
        }

        // Cursor points at index 4; the new set has two nodes.
        lb.update(&ctx, nodes(&["x", "y"])).unwrap();
        assert_eq!(picked_name(&lb), "x");
        assert_eq!(picked_name(&lb), "y");
        assert_eq!(picked_name(&lb), "x");
    }
}
