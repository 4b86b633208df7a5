//! ## dcsim-telemetry::metrics
//! **Prometheus exporter for simulation outcomes**
//!
//! Mirrors the engine's completion/drop accounting as counters and records
//! response times in a histogram, rendered in the text exposition format.

use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Registry, TextEncoder};

const RESPONSE_TIME_BUCKETS: [f64; 10] = [0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0, 256.0];

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub arrived: Counter,
    pub completed: Counter,
    pub dropped: Counter,
    pub response_time: Histogram,
}

impl MetricsRecorder {
    /// Creates a recorder with its own registry.
    ///
    /// # Errors
    /// - `prometheus::Error` - metric construction or registration failed
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let arrived = Counter::new("dcsim_requests_arrived_total", "Requests generated")?;
        let completed = Counter::new("dcsim_requests_completed_total", "Requests completed")?;
        let dropped = Counter::new(
            "dcsim_requests_dropped_total",
            "Requests dropped after waiting longer than their timeout",
        )?;
        let response_time = Histogram::with_opts(
            HistogramOpts::new("dcsim_response_time", "Request response time in time units")
                .buckets(RESPONSE_TIME_BUCKETS.to_vec()),
        )?;

        registry.register(Box::new(arrived.clone()))?;
        registry.register(Box::new(completed.clone()))?;
        registry.register(Box::new(dropped.clone()))?;
        registry.register(Box::new(response_time.clone()))?;

        Ok(Self {
            registry,
            arrived,
            completed,
            dropped,
            response_time,
        })
    }

    pub fn inc_arrived(&self) {
        self.arrived.inc();
    }

    pub fn observe_completion(&self, response_time: f64) {
        self.completed.inc();
        self.response_time.observe(response_time);
    }

    pub fn inc_dropped(&self) {
        self.dropped.inc();
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}
