//! Selector simulation tool.
//!
//! Loads a node list, builds the configured strategy and drives it with
//! concurrent simulated calls, then prints how picks were distributed.
//!
//! ```text
//!   config (TOML) ──▶ builder ──▶ selector.update(nodes)
//!                                      │
//!        ┌─────────────┬───────────────┼───────────────┐
//!        ▼             ▼               ▼               ▼
//!     worker 0      worker 1   ...  worker N-1     (tokio tasks)
//!     pick → hold → done        ...
//!                                      │
//!                                      ▼
//!                         per-address pick counts (JSON)
//! ```

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dashmap::DashMap;
use tokio::task::JoinSet;

use node_selector::config::validation::validate_config;
use node_selector::config::{load_config, ConfigError, SelectorConfig};
use node_selector::observability::{logging, metrics};
use node_selector::selector::{self, DoneInfo, PickContext, Selector, SelectorError};

#[derive(Parser)]
#[command(name = "selector-sim")]
#[command(about = "Drive a node selector with simulated concurrent calls", long_about = None)]
struct Cli {
    /// TOML config file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured strategy.
    #[arg(short, long)]
    strategy: Option<String>,

    /// Override the number of picks.
    #[arg(short, long)]
    picks: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SelectorConfig::default(),
    };
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if let Some(picks) = cli.picks {
        config.simulation.picks = picks;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability)?;

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    selector::set_builder(config.builder().map_err(ConfigError::from)?);
    let selector: Arc<dyn Selector> = Arc::from(selector::get_builder().build());
    selector.update(&PickContext::new(), config.to_nodes())?;

    let picks = config.simulation.picks;
    let concurrency = config.simulation.concurrency;
    let hold_ms = config.simulation.hold_ms;
    tracing::info!(
        strategy = selector.name(),
        nodes = config.nodes.len(),
        picks,
        concurrency,
        "Simulation starting"
    );

    let counts: Arc<DashMap<String, u64>> = Arc::new(DashMap::new());
    let mut workers = JoinSet::new();
    for worker in 0..concurrency {
        let quota = picks / concurrency + usize::from(worker < picks % concurrency);
        let selector = selector.clone();
        let counts = counts.clone();
        workers.spawn(run_worker(selector, counts, quota, hold_ms));
    }
    while let Some(result) = workers.join_next().await {
        result??;
    }

    let distribution: BTreeMap<String, u64> = counts
        .iter()
        .map(|entry| (entry.key().clone(), *entry.value()))
        .collect();
    let report = serde_json::json!({
        "strategy": selector.name(),
        "picks": picks,
        "distribution": distribution,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!("Simulation complete");
    Ok(())
}

async fn run_worker(
    selector: Arc<dyn Selector>,
    counts: Arc<DashMap<String, u64>>,
    quota: usize,
    hold_ms: u64,
) -> Result<(), SelectorError> {
    let ctx = PickContext::with_method("simulate");
    for _ in 0..quota {
        let picked = selector.pick_available(&ctx)?;
        *counts.entry(picked.node.address().to_string()).or_insert(0) += 1;

        tokio::time::sleep(Duration::from_millis(fastrand::u64(0..=hold_ms))).await;

        picked.finish(
            &ctx,
            DoneInfo {
                bytes_sent: true,
                bytes_received: true,
                ..DoneInfo::default()
            },
        );
    }
    Ok(())
}
