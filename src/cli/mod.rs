//! CLI module for esxi-harden
//!
//! Argument parsing and output rendering for the `esxi-harden` binary.

pub mod output;

use clap::Parser;
use esxi_harden::config::{Mode, RunOptions};
use std::path::PathBuf;

/// esxi-harden - audit and remediate the host hardening baseline
#[derive(Parser, Debug, Clone)]
#[command(name = "esxi-harden")]
#[command(version)]
#[command(about = "Audit and remediate the hardening baseline on virtualization hosts", long_about = None)]
pub struct Cli {
    /// YAML inventory snapshot of the hosts to check
    #[arg(env = "ESXI_HARDEN_HOSTS")]
    pub hosts: PathBuf,

    /// Run mode: `scan` reports only, `fix` remediates
    #[arg(short = 'm', long, default_value = "scan", env = "ESXI_HARDEN_MODE")]
    pub mode: Mode,

    /// Also check virtual witness appliances
    #[arg(long)]
    pub include_witness: bool,

    /// Also check hosts in clusters that are still being configured
    #[arg(long)]
    pub include_pending: bool,

    /// Verbosity level (-v shows compliant settings, -vv adds debug logs)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-4)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(4)
    }

    /// Build the engine options for this invocation.
    pub fn run_options(&self) -> RunOptions {
        RunOptions::new(self.mode)
            .with_include_witness(self.include_witness)
            .with_include_pending(self.include_pending)
    }
}
