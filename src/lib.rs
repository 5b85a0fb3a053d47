//! Client-side node selection for RPC load balancing.
//!
//! A [`Selector`](selector::Selector) holds the current set of backend nodes
//! reported by discovery and picks one per outgoing call. Four strategies are
//! provided (random, weighted random, round-robin, least-connection), each
//! constructed through a named [`Builder`](selector::Builder).

pub mod config;
pub mod observability;
pub mod selector;

pub use config::SelectorConfig;
pub use selector::{
    Builder, DoneFunc, DoneInfo, Node, PickContext, Picked, Selector, SelectorError, Service,
    ServiceNode,
};
