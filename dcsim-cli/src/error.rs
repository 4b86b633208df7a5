use dcsim_config::ConfigError;
use dcsim_core::SimulationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("Metrics export error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    #[error("Fingerprint mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}
