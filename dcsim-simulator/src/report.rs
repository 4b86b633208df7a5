//! Run summary and determinism fingerprint.

use std::fmt;

use blake3::Hasher;
use dcsim_core::{DispatchPolicy, MetricsCollector, SimTime};
use serde::Serialize;

/// Outcome of a finished simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub policy: DispatchPolicy,
    /// Seed that reproduces this run.
    pub seed: u64,
    pub servers: usize,
    /// Theoretical utilization ρ = λ / (N·μ).
    pub utilization: f64,
    pub final_time: SimTime,
    /// Requests created during the run.
    pub generated: u64,
    pub completed: u64,
    pub dropped: u64,
    /// Requests still queued when the run ended; neither completed nor dropped.
    pub abandoned: u64,
    pub drop_rate: f64,
    pub average_response_time: SimTime,
    pub median_response_time: SimTime,
    pub p95_response_time: SimTime,
    /// BLAKE3 hash of the counts and the response-time sequence, hex encoded.
    pub fingerprint: String,
}

impl SimulationReport {
    /// Completed plus dropped requests.
    pub fn total_requests(&self) -> u64 {
        self.completed + self.dropped
    }
}

/// Hashes everything a seed is expected to reproduce.
pub fn fingerprint(generated: u64, abandoned: u64, metrics: &MetricsCollector) -> String {
    let mut hasher = Hasher::new();
    hasher.update(&generated.to_le_bytes());
    hasher.update(&metrics.completed().to_le_bytes());
    hasher.update(&metrics.dropped().to_le_bytes());
    hasher.update(&abandoned.to_le_bytes());
    for response_time in metrics.response_times() {
        hasher.update(&response_time.to_bits().to_le_bytes());
    }
    hex::encode(hasher.finalize().as_bytes())
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "=".repeat(50);
        writeln!(f, "{separator}")?;
        writeln!(f, "       Data Center Simulation - Metrics Report")?;
        writeln!(f, "{separator}")?;
        writeln!(f, "  Policy                        : {}", self.policy)?;
        writeln!(f, "  Total requests arrived        : {}", self.total_requests())?;
        writeln!(f, "  Completed requests            : {}", self.completed)?;
        writeln!(f, "  Dropped requests              : {}", self.dropped)?;
        writeln!(f, "  Abandoned at end of run       : {}", self.abandoned)?;
        writeln!(f, "  Drop rate                     : {:.2}%", self.drop_rate * 100.0)?;
        writeln!(
            f,
            "  Avg response time             : {:.4} time units",
            self.average_response_time
        )?;
        if self.completed > 0 {
            writeln!(
                f,
                "  Median response time          : {:.4} time units",
                self.median_response_time
            )?;
            writeln!(
                f,
                "  95th percentile response time : {:.4} time units",
                self.p95_response_time
            )?;
        }
        writeln!(f, "  Theoretical utilisation       : ρ = {:.4}", self.utilization)?;
        writeln!(f, "  Seed                          : {}", self.seed)?;
        writeln!(f, "  Fingerprint                   : {}", self.fingerprint)?;
        write!(f, "{separator}")
    }
}
