use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dcsim_config::{ConfigError, DcsimConfig, SimulationConfig};
use dcsim_simulator::{SimulationEngine, SimulationReport};
use dcsim_telemetry::{EventLogger, MetricsRecorder};
use tracing::info;
use validator::Validate;

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "dcsim", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single simulation and print its report
    Run(RunArgs),
    /// Run the same configuration under each configured dispatch policy
    Compare(CompareArgs),
    /// Load, validate and print the resolved configuration
    CheckConfig(ConfigArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// YAML configuration file (defaults to config/dcsim.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct SimulationOverrides {
    #[command(flatten)]
    pub source: ConfigArgs,
    /// Dispatch policy (cyclic | least-loaded)
    #[arg(long)]
    pub policy: Option<String>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub servers: Option<usize>,
    /// Mean arrivals per time unit (λ)
    #[arg(long)]
    pub arrival_rate: Option<f64>,
    /// Service completions per time unit per server (μ)
    #[arg(long)]
    pub service_rate: Option<f64>,
    #[arg(long)]
    pub duration: Option<f64>,
    #[arg(long)]
    pub step: Option<f64>,
    /// Maximum queued wait before a request is dropped
    #[arg(long)]
    pub timeout: Option<f64>,
    /// Print Prometheus metrics after each run
    #[arg(long)]
    pub prometheus: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub overrides: SimulationOverrides,
    /// Fail unless the run fingerprint equals this hex string
    #[arg(long)]
    pub validate_hash: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub overrides: SimulationOverrides,
    /// Policies to compare, in order (defaults to the configured list)
    #[arg(long, value_delimiter = ',')]
    pub policies: Vec<String>,
}

pub fn run_command(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Run(args) => {
            let config = resolve_config(&args.overrides)?;
            EventLogger::init(Some(&config.telemetry.log_filter));
            let report = run_simulation(&config.simulation, config.telemetry.prometheus)?;
            if let Some(expected) = args.validate_hash {
                verify_fingerprint(&report, &expected)?;
                info!(fingerprint = %report.fingerprint, "Fingerprint verified");
            }
            Ok(())
        }
        Commands::Compare(args) => {
            let mut config = resolve_config(&args.overrides)?;
            if !args.policies.is_empty() {
                config.experiment.policies = args.policies;
                config.validate().map_err(ConfigError::from)?;
            }
            EventLogger::init(Some(&config.telemetry.log_filter));
            run_comparison(&config)?;
            Ok(())
        }
        Commands::CheckConfig(args) => {
            let config = load_config(&args)?;
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}

fn load_config(args: &ConfigArgs) -> Result<DcsimConfig, ConfigError> {
    match &args.config {
        Some(path) => DcsimConfig::load_from_path(path),
        None => DcsimConfig::load(),
    }
}

/// Loads the configuration, applies command-line overrides and revalidates.
fn resolve_config(overrides: &SimulationOverrides) -> Result<DcsimConfig, ConfigError> {
    let mut config = load_config(&overrides.source)?;
    apply_overrides(&mut config, overrides);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut DcsimConfig, overrides: &SimulationOverrides) {
    let simulation = &mut config.simulation;
    if let Some(policy) = &overrides.policy {
        simulation.policy = policy.clone();
    }
    if let Some(seed) = overrides.seed {
        simulation.seed = Some(seed);
    }
    if let Some(servers) = overrides.servers {
        simulation.servers = servers;
    }
    if let Some(rate) = overrides.arrival_rate {
        simulation.arrival_rate = rate;
    }
    if let Some(rate) = overrides.service_rate {
        simulation.service_rate = rate;
    }
    if let Some(duration) = overrides.duration {
        simulation.duration = duration;
    }
    if let Some(step) = overrides.step {
        simulation.step = step;
    }
    if let Some(timeout) = overrides.timeout {
        simulation.request_timeout = Some(timeout);
    }
    if overrides.prometheus {
        config.telemetry.prometheus = true;
    }
}

/// Runs one simulation and prints its report.
fn run_simulation(
    simulation: &SimulationConfig,
    prometheus: bool,
) -> Result<SimulationReport, CliError> {
    let mut engine = SimulationEngine::new(simulation)?;
    let recorder = if prometheus {
        let recorder = MetricsRecorder::new()?;
        engine = engine.with_recorder(recorder.clone());
        Some(recorder)
    } else {
        None
    };

    let report = engine.run()?;
    println!("{report}");
    if let Some(recorder) = recorder {
        print!("{}", recorder.gather_metrics()?);
    }
    Ok(report)
}

/// Runs the configuration once per policy, each under its own banner.
fn run_comparison(config: &DcsimConfig) -> Result<Vec<SimulationReport>, CliError> {
    println!("\n Data Center Load Simulation \n");
    let mut reports = Vec::with_capacity(config.experiment.policies.len());
    for policy in &config.experiment.policies {
        println!("{}", banner(policy));
        let simulation = config.simulation.with_policy(policy.as_str());
        reports.push(run_simulation(&simulation, config.telemetry.prometheus)?);
        println!();
    }
    Ok(reports)
}

fn banner(policy: &str) -> String {
    let rule = "=".repeat(60);
    let title = policy.to_uppercase().replace(['_', '-'], " ");
    format!("{rule}\n  Experiment - policy: {title}\n{rule}")
}

fn verify_fingerprint(report: &SimulationReport, expected: &str) -> Result<(), CliError> {
    if report.fingerprint.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(CliError::HashMismatch {
            expected: expected.to_string(),
            actual: report.fingerprint.clone(),
        })
    }
}
