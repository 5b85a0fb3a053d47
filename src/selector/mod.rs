//! Node selection subsystem.
//!
//! # Data Flow
//! ```text
//! Discovery watcher reports a changed service list
//!     → adapter turns entries into `Node`s (node.rs)
//!     → Selector::update(nodes) swaps the candidate set under the write lock
//!
//! Outgoing call
//!     → Selector::pick(ctx) under the read lock:
//!         - random.rs (uniform index)
//!         - weight.rs (uniform index over the weight-expanded set)
//!         - round_robin.rs (shared cursor, modulo current length)
//!         - least_conn.rs (minimum in-flight, counter bumped before return)
//!     → adapter performs the call
//!     → DoneFunc::call(ctx, info) releases per-call bookkeeping
//! ```
//!
//! # Design Decisions
//! - One reader-writer lock per selector; picks share it, updates exclude everything
//! - Updates replace the whole set, there is no incremental diffing
//! - An empty set is `Ok(None)`, never a panic
//! - Builders are looked up by name through registry.rs

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

pub mod least_conn;
pub mod node;
pub mod random;
pub mod registry;
pub mod round_robin;
pub mod weight;

pub use least_conn::{LeastConnBuilder, LeastConnSelector};
pub use node::{Metadata, Node, Service, ServiceNode, WEIGHT_KEY};
pub use random::{RandomBuilder, RandomSelector};
pub use registry::{
    builder_by_name, get_builder, register_builder, registered_names, reset_builder, set_builder,
    set_builder_by_name, SharedBuilder,
};
pub use round_robin::{RoundRobinBuilder, RoundRobinSelector};
pub use weight::{WeightBuilder, WeightSelector, MAX_WEIGHT};

/// Errors surfaced by selectors and the builder registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The current node set has nothing pickable.
    #[error("no node available for selector {strategy}")]
    NoNodeAvailable { strategy: &'static str },

    /// No builder is registered under the requested name.
    #[error("unknown selector strategy: {0}")]
    UnknownStrategy(String),
}

/// Per-call context handed to `pick`, `update` and the done callback.
#[derive(Debug, Clone, Default)]
pub struct PickContext {
    /// Method being invoked, used only as a log field.
    pub method: Option<String>,
}

impl PickContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(method: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
        }
    }
}

/// Outcome of a finished call, reported back through [`DoneFunc`].
///
/// None of the built-in strategies read these fields; they are carried for
/// strategies that adapt to errors or server-reported load.
#[derive(Debug, Clone, Default)]
pub struct DoneInfo {
    /// Error message when the call failed.
    pub err: Option<String>,
    /// Whether any bytes went out on the wire.
    pub bytes_sent: bool,
    /// Whether any bytes came back.
    pub bytes_received: bool,
    /// Opaque load report from the server.
    pub server_load: Option<serde_json::Value>,
}

/// Completion callback returned by [`Selector::pick`].
///
/// Calling it consumes it, so it can fire at most once. Strategies that keep
/// per-call state release it on drop as well, so a callback that is dropped
/// without being called does not leak that state.
pub struct DoneFunc(Box<dyn FnOnce(&PickContext, DoneInfo) + Send + Sync>);

impl DoneFunc {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&PickContext, DoneInfo) + Send + Sync + 'static,
    {
        Self(Box::new(f))
    }

    /// Report the call outcome.
    pub fn call(self, ctx: &PickContext, info: DoneInfo) {
        (self.0)(ctx, info)
    }
}

impl fmt::Debug for DoneFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DoneFunc")
    }
}

/// Result of a successful pick.
#[derive(Debug)]
pub struct Picked {
    pub node: Arc<dyn Node>,
    pub done: Option<DoneFunc>,
}

impl Picked {
    /// Invoke the done callback if the strategy returned one.
    pub fn finish(self, ctx: &PickContext, info: DoneInfo) {
        if let Some(done) = self.done {
            done.call(ctx, info);
        }
    }
}

/// A stateful node selection algorithm.
///
/// `pick` and `update` may be called concurrently from any number of threads.
/// Neither blocks on I/O.
pub trait Selector: Send + Sync + fmt::Debug {
    /// Stable strategy name.
    fn name(&self) -> &'static str;

    /// Choose a node for the next call.
    ///
    /// Returns `Ok(None)` when nothing is pickable; the caller should treat that
    /// as "no backend available" and fail the call.
    fn pick(&self, ctx: &PickContext) -> Result<Option<Picked>, SelectorError>;

    /// Replace the candidate set. Concurrent picks see either the old set or the
    /// new one, never a mix.
    fn update(&self, ctx: &PickContext, nodes: Vec<Arc<dyn Node>>) -> Result<(), SelectorError>;

    /// Number of pickable entries in the current set.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Like [`pick`](Selector::pick), but maps an empty set to
    /// [`SelectorError::NoNodeAvailable`].
    fn pick_available(&self, ctx: &PickContext) -> Result<Picked, SelectorError> {
        self.pick(ctx)?.ok_or(SelectorError::NoNodeAvailable {
            strategy: self.name(),
        })
    }
}

/// Named factory for a selector strategy.
pub trait Builder: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Create a fresh, empty selector.
    fn build(&self) -> Box<dyn Selector>;
}
