//! Metrics collection and exposition.
//!
//! # Metrics
//! - `selector_picks_total` (counter): picks by strategy and outcome (`hit`/`empty`)
//! - `selector_updates_total` (counter): node set replacements by strategy
//! - `selector_nodes` (gauge): pickable entries after the last update
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; nothing is exported unless
//!   `init_metrics` installed the Prometheus recorder

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Outcome label for a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    Hit,
    Empty,
}

impl PickOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            PickOutcome::Hit => "hit",
            PickOutcome::Empty => "empty",
        }
    }
}

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_pick(strategy: &'static str, outcome: PickOutcome) {
    metrics::counter!("selector_picks_total", "strategy" => strategy, "outcome" => outcome.as_str())
        .increment(1);
}

pub fn record_update(strategy: &'static str, nodes: usize) {
    metrics::counter!("selector_updates_total", "strategy" => strategy).increment(1);
    metrics::gauge!("selector_nodes", "strategy" => strategy).set(nodes as f64);
}
