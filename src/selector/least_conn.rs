//! Least-connection selection strategy.
//!
//! Every node is wrapped with an in-flight counter. `pick` returns the node
//! with the fewest in-flight calls (first in slice order on ties) and bumps
//! its counter before returning; the done callback releases it.
//!
//! `update` wraps every node afresh with a zero counter, including nodes that
//! were already present. Calls still running against the old wrappers release
//! the old counters, so new counters never go negative, but fairness is lost
//! for those calls until they complete.
//!
//! The scan and the increment are separate steps under a shared read lock.
//! Two concurrent picks can both see the same node as least loaded and both
//! take it before either increment lands, so a burst may briefly overload one
//! node. Counters stay exact; only the choice is approximate.

use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::observability::metrics::{self, PickOutcome};
use crate::selector::{Builder, DoneFunc, Node, PickContext, Picked, Selector, SelectorError};

pub const NAME: &str = "least-connection";

#[derive(Debug, Default, Clone, Copy)]
pub struct LeastConnBuilder;

impl Builder for LeastConnBuilder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn build(&self) -> Box<dyn Selector> {
        Box::new(LeastConnSelector::new())
    }
}

/// A node plus the number of calls dispatched to it and not yet done.
#[derive(Debug)]
pub struct LeastConnNode {
    node: Arc<dyn Node>,
    inflight: AtomicUsize,
}

impl LeastConnNode {
    fn new(node: Arc<dyn Node>) -> Self {
        Self {
            node,
            inflight: AtomicUsize::new(0),
        }
    }

    pub fn node(&self) -> &Arc<dyn Node> {
        &self.node
    }

    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::Acquire)
    }

    fn acquire(self: &Arc<Self>) -> InflightGuard {
        self.inflight.fetch_add(1, Ordering::AcqRel);
        InflightGuard {
            node: self.clone(),
        }
    }
}

/// A RAII guard that holds one in-flight slot on a node.
#[derive(Debug)]
struct InflightGuard {
    node: Arc<LeastConnNode>,
}

impl Deref for InflightGuard {
    type Target = LeastConnNode;
    fn deref(&self) -> &Self::Target {
        &self.node
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.node.inflight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Least connections selector.
#[derive(Debug, Default)]
pub struct LeastConnSelector {
    nodes: RwLock<Vec<Arc<LeastConnNode>>>,
}

impl LeastConnSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current wrappers, in slice order.
    pub fn snapshot(&self) -> Vec<Arc<LeastConnNode>> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Selector for LeastConnSelector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn pick(&self, ctx: &PickContext) -> Result<Option<Picked>, SelectorError> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);

        // min_by_key keeps the first of equal minimums, so ties resolve in slice order
        let Some(chosen) = nodes.iter().min_by_key(|n| n.inflight()) else {
            metrics::record_pick(NAME, PickOutcome::Empty);
            tracing::debug!(strategy = NAME, "No node available");
            return Ok(None);
        };

        let guard = chosen.acquire();
        tracing::trace!(
            strategy = NAME,
            address = %guard.node().address(),
            inflight = guard.inflight(),
            method = ctx.method.as_deref().unwrap_or(""),
            "Node picked"
        );
        metrics::record_pick(NAME, PickOutcome::Hit);

        let node = guard.node().clone();
        // Calling or dropping the callback drops the guard exactly once.
        let done = DoneFunc::new(move |_ctx, _info| drop(guard));
        Ok(Some(Picked {
            node,
            done: Some(done),
        }))
    }

    fn update(&self, _ctx: &PickContext, nodes: Vec<Arc<dyn Node>>) -> Result<(), SelectorError> {
        let wrapped: Vec<_> = nodes
            .into_iter()
            .map(|n| Arc::new(LeastConnNode::new(n)))
            .collect();
        let count = wrapped.len();

        *self.nodes.write().unwrap_or_else(PoisonError::into_inner) = wrapped;
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
    use crate::selector::testing::nodes;
    use crate::selector::DoneInfo;

    fn inflight(lb: &LeastConnSelector) -> Vec<usize> {
        lb.snapshot().iter().map(|n| n.inflight()).collect()
    }

    fn pick(lb: &LeastConnSelector) -> (String, DoneFunc) {
        let picked = lb.pick_available(&PickContext::new()).unwrap();
        let done = picked.done.expect("least-connection always returns done");
        (picked.node.service().name.clone(), done)
    }

    #[test]
    fn test_least_conn_ties_and_release() {
        let lb = LeastConnSelector::new();
        let ctx = PickContext::new();
        lb.update(&ctx, nodes(&["a", "b"])).unwrap();

        let (first, done_a1) = pick(&lb);
        assert_eq!(first, "a");
        assert_eq!(inflight(&lb), vec![1, 0]);

        let (second, _done_b) = pick(&lb);
        assert_eq!(second, "b");
        assert_eq!(inflight(&lb), vec![1, 1]);

        // Tie goes to the first node.
        let (third, _done_a2) = pick(&lb);
        assert_eq!(third, "a");
        assert_eq!(inflight(&lb), vec![2, 1]);

        done_a1.call(&ctx, DoneInfo::default());
        assert_eq!(inflight(&lb), vec![1, 1]);
    }

    #[test]
    fn test_prefers_least_loaded() {
        let lb = LeastConnSelector::new();
        lb.update(&PickContext::new(), nodes(&["a", "b", "c"]))
            .unwrap();

        let held: Vec<_> = (0..5).map(|_| pick(&lb)).collect();
        assert_eq!(inflight(&lb), vec![2, 2, 1]);

        let (name, _done) = pick(&lb);
        assert_eq!(name, "c");
        drop(held);
        assert_eq!(inflight(&lb), vec![0, 0, 1]);
    }

    #[test]
    fn test_dropped_done_releases_slot() {
        let lb = LeastConnSelector::new();
        lb.update(&PickContext::new(), nodes(&["a"])).unwrap();

        let picked = lb.pick(&PickContext::new()).unwrap().unwrap();
        assert_eq!(inflight(&lb), vec![1]);
        drop(picked);
        assert_eq!(inflight(&lb), vec![0]);
    }

    #[test]
    fn test_update_resets_counters() {
        let lb = LeastConnSelector::new();
        let ctx = PickContext::new();
        lb.update(&ctx, nodes(&["a", "b"])).unwrap();

        let (_, done_a) = pick(&lb);
        let (_, done_b) = pick(&lb);
        assert_eq!(inflight(&lb), vec![1, 1]);

        lb.update(&ctx, nodes(&["a", "b"])).unwrap();
        assert_eq!(inflight(&lb), vec![0, 0]);

        // Late completions land on the retired wrappers.
        done_a.call(&ctx, DoneInfo::default());
        done_b.call(&ctx, DoneInfo::default());
        assert_eq!(inflight(&lb), vec![0, 0]);
    }
}
