//! # Telemetry
//!
//! Structured logging and Prometheus metrics shared by the indexer pipeline
//! and the blacklist plugin. Neither plugin talks to Loki/Tempo directly;
//! this crate owns the one-time subscriber install and the metric registry,
//! the same way the rest of this workspace keeps telemetry out of domain
//! crates.

mod logging;
mod metrics;

pub use logging::{init_tracing, TelemetryError};
pub use metrics::Metrics;
