use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Configuration error: unknown dispatch policy '{0}' (expected 'cyclic' or 'least-loaded')")]
    UnknownPolicy(String),

    #[error("Configuration error: dispatcher has no servers configured")]
    NoServers,

    #[error("Configuration error: invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Simulation already reached its duration at t={0}")]
    RunFinished(f64),
}

impl SimulationError {
    /// True for errors caused by the configuration rather than by how the
    /// engine is driven.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SimulationError::UnknownPolicy(_)
                | SimulationError::NoServers
                | SimulationError::InvalidParameter { .. }
        )
    }

    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
