//! Process-wide builder registry.
//!
//! # Responsibilities
//! - Map strategy names to builders so adapters can instantiate by name
//! - Hold the default builder used when nothing else is wired in
//!
//! The default is Round-Robin until `set_builder` is called. It is meant to
//! be set once at startup; `reset_builder` restores Round-Robin.

use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::selector::{
    Builder, LeastConnBuilder, RandomBuilder, RoundRobinBuilder, SelectorError, WeightBuilder,
};

/// A builder shared across the process.
pub type SharedBuilder = Arc<dyn Builder>;

static DEFAULT_BUILDER: LazyLock<ArcSwap<SharedBuilder>> =
    LazyLock::new(|| ArcSwap::from_pointee(Arc::new(RoundRobinBuilder) as SharedBuilder));

static BUILDERS: LazyLock<DashMap<&'static str, SharedBuilder>> = LazyLock::new(|| {
    let builders: [SharedBuilder; 4] = [
        Arc::new(RandomBuilder),
        Arc::new(WeightBuilder::default()),
        Arc::new(RoundRobinBuilder),
        Arc::new(LeastConnBuilder),
    ];
    builders.into_iter().map(|b| (b.name(), b)).collect()
});

/// Set the process default builder.
pub fn set_builder(builder: SharedBuilder) {
    tracing::info!(strategy = builder.name(), "Default selector builder set");
    DEFAULT_BUILDER.store(Arc::new(builder));
}

/// Set the process default builder from the name table.
pub fn set_builder_by_name(name: &str) -> Result<(), SelectorError> {
    let builder =
        builder_by_name(name).ok_or_else(|| SelectorError::UnknownStrategy(name.to_string()))?;
    set_builder(builder);
    Ok(())
}

/// Current process default builder.
pub fn get_builder() -> SharedBuilder {
    let current = DEFAULT_BUILDER.load();
    Arc::clone(&**current)
}

/// Restore Round-Robin as the default.
pub fn reset_builder() {
    DEFAULT_BUILDER.store(Arc::new(Arc::new(RoundRobinBuilder)));
}

/// Register (or replace) a builder under its own name.
pub fn register_builder(builder: SharedBuilder) {
    tracing::debug!(strategy = builder.name(), "Selector builder registered");
    BUILDERS.insert(builder.name(), builder);
}

pub fn builder_by_name(name: &str) -> Option<SharedBuilder> {
    BUILDERS.get(name).map(|entry| entry.value().clone())
}

/// Registered strategy names, sorted.
pub fn registered_names() -> Vec<&'static str> {
    let mut names: Vec<_> = BUILDERS.iter().map(|entry| *entry.key()).collect();
    names.sort_unstable();
    names
}
