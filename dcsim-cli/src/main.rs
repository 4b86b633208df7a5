//! ## dcsim-cli
//! **Command-line driver for the data center simulation**
//!
//! `dcsim run` executes one configured run, `dcsim compare` runs the same
//! configuration under every configured dispatch policy back to back, and
//! `dcsim check-config` prints the resolved configuration.

use std::process::ExitCode;

use clap::Parser;

mod commands;
mod error;

use commands::Cli;

fn main() -> ExitCode {
    match commands::run_command(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
