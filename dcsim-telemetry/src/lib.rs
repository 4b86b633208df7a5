//! # dcsim Telemetry
//!
//! Crate for logging setup and Prometheus metrics export.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
