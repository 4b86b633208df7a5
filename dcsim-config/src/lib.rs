//! # dcsim Configuration System
//!
//! Layered configuration for the data center simulation.
//!
//! ## Features
//! - **Unified Configuration**: one document for simulation, experiment and telemetry
//! - **Validation**: every numeric parameter is range-checked at load time
//! - **Environment Awareness**: `DCSIM_*` variables override file values

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod experiment;
mod simulation;
mod telemetry;
mod validation;

pub use error::ConfigError;
pub use experiment::ExperimentConfig;
pub use simulation::SimulationConfig;
pub use telemetry::TelemetryConfig;

/// Base configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/dcsim.yaml";

/// Top‑level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct DcsimConfig {
    /// Parameters of a single simulation run.
    #[serde(default)]
    #[validate(nested)]
    pub simulation: SimulationConfig,

    /// Policies compared by the `compare` command.
    #[serde(default)]
    #[validate(nested)]
    pub experiment: ExperimentConfig,

    /// Logging and metrics export.
    #[serde(default)]
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl DcsimConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/dcsim.yaml`, if present
    /// 3. `config/<DCSIM_ENV>.yaml`, if present
    /// 4. `DCSIM_*` environment variables (`__` separates nested keys)
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(DcsimConfig::default()));

        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            figment = figment.merge(Yaml::file(DEFAULT_CONFIG_PATH));
        }

        if let Ok(env) = std::env::var("DCSIM_ENV") {
            let env_file = format!("config/{}.yaml", env);
            if Path::new(&env_file).exists() {
                figment = figment.merge(Yaml::file(env_file));
            }
        }

        Self::extract(figment)
    }

    /// Load configuration from a specific YAML file plus environment.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment =
            Figment::from(Serialized::defaults(DcsimConfig::default())).merge(Yaml::file(path));
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed("DCSIM_").ignore(&["ENV"]).split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
