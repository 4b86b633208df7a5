//! Simulation run parameters.
//!
//! Defaults reproduce the reference experiment: three servers at
//! λ = 2.0 and μ = 1.5 for 500 time units, one-unit steps, a 50-unit
//! request timeout and seed 42.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of independent servers.
    #[serde(default = "default_servers")]
    #[validate(range(min = 1, max = 100_000))]
    pub servers: usize,

    /// Mean arrivals per time unit (Poisson). Zero disables arrivals.
    #[serde(default = "default_arrival_rate")]
    #[validate(range(min = 0.0), custom(function = validation::validate_finite))]
    pub arrival_rate: f64,

    /// Service completions per time unit per server (exponential).
    #[serde(default = "default_service_rate")]
    #[validate(range(exclusive_min = 0.0), custom(function = validation::validate_finite))]
    pub service_rate: f64,

    /// Total simulated time span.
    #[serde(default = "default_duration")]
    #[validate(range(min = 0.0), custom(function = validation::validate_finite))]
    pub duration: f64,

    /// Clock granularity.
    #[serde(default = "default_step")]
    #[validate(range(exclusive_min = 0.0), custom(function = validation::validate_finite))]
    pub step: f64,

    /// Dispatch policy name (`cyclic` or `least-loaded`).
    #[serde(default = "default_policy")]
    #[validate(custom(function = validation::validate_policy))]
    pub policy: String,

    /// Maximum queued wait before a request is dropped. Absent means unbounded.
    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 0.0))]
    pub request_timeout: Option<f64>,

    /// Seed for the random stream. Absent means OS entropy.
    #[serde(default = "default_seed")]
    pub seed: Option<u64>,
}

fn default_servers() -> usize {
    3
}

fn default_arrival_rate() -> f64 {
    2.0
}

fn default_service_rate() -> f64 {
    1.5
}

fn default_duration() -> f64 {
    500.0
}

fn default_step() -> f64 {
    1.0
}

fn default_policy() -> String {
    "cyclic".into()
}

fn default_request_timeout() -> Option<f64> {
    Some(50.0)
}

fn default_seed() -> Option<u64> {
    Some(42)
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            arrival_rate: default_arrival_rate(),
            service_rate: default_service_rate(),
            duration: default_duration(),
            step: default_step(),
            policy: default_policy(),
            request_timeout: default_request_timeout(),
            seed: default_seed(),
        }
    }
}

impl SimulationConfig {
    /// Returns a copy of this configuration running under another policy.
    pub fn with_policy(&self, policy: impl Into<String>) -> Self {
        Self {
            policy: policy.into(),
            ..self.clone()
        }
    }

    /// Theoretical utilization ρ = λ / (N·μ).
    pub fn utilization(&self) -> f64 {
        self.arrival_rate / (self.servers as f64 * self.service_rate)
    }
}
