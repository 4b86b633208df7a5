//! ## dcsim-telemetry::logging
//! **Structured logging with `tracing`**
//!
//! `RUST_LOG` takes precedence over the configured filter. Without either,
//! the subscriber logs at `info`.

use tracing::trace_span;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. Later calls are no-ops, so tests and
    /// repeated runs inside one process can call this freely.
    pub fn init(filter: Option<&str>) {
        let _ = fmt()
            .with_env_filter(Self::env_filter(filter))
            .with_target(false)
            .with_span_events(FmtSpan::CLOSE)
            .try_init();
    }

    fn env_filter(filter: Option<&str>) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(filter.unwrap_or("info")))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Logs a finished request (`completed` or `dropped`) at trace level.
    pub fn log_outcome(outcome: &str, request_id: u64, at: f64) {
        let span = trace_span!("request_outcome", outcome = outcome);
        let _entered = span.enter();
        tracing::trace!(request_id, at, "Request finished");
    }
}
