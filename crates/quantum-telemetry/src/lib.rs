//! # Node Telemetry
//!
//! Structured logging (`tracing` + `tracing-subscriber`) and a small set of
//! in-process counters, shared by every subsystem crate.
//!
//! ```rust,ignore
//! use quantum_telemetry::{TelemetryConfig, init_telemetry};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_telemetry(config).expect("failed to init telemetry");
//! ```

#![warn(missing_docs)]
#![allow(missing_docs)] // TODO: Add documentation for all public items

mod config;
mod logging;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{Counters, CounterSnapshot};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global `tracing` subscriber could not be installed.
    #[error("failed to initialize tracing subscriber: {0}")]
    TracerInit(String),
}

/// Initialize structured logging for the process.
///
/// Returns a guard; dropping it is a no-op today but keeps the call site
/// stable if log flushing is ever needed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TracingGuard, TelemetryError> {
    tracing_setup::init_tracing(&config)
}
