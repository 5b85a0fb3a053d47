//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Selectors produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (pick/update counters, node gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`strategy`, `nodes`, `address`) rather than formatted strings
//! - Metrics are no-ops until a recorder is installed, so library users pay nothing

pub mod logging;
pub mod metrics;
