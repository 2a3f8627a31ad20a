//! esxi-harden - hardening compliance for virtualization hosts
//!
//! This is the main entry point for the esxi-harden CLI.

mod cli;

use anyhow::{Context, Result};
use cli::output::OutputFormatter;
use cli::Cli;
use esxi_harden::baseline::Baseline;
use esxi_harden::inventory::SnapshotInventory;
use esxi_harden::runner::HostComplianceRunner;
use is_terminal::IsTerminal;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code when at least one host is not compliant
const EXIT_NON_COMPLIANT: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    if cli.verbosity() >= 2 {
        eprintln!("esxi-harden v{}", VERSION);
    }

    let inventory = SnapshotInventory::from_file(&cli.hosts)
        .with_context(|| format!("Failed to load hosts from {}", cli.hosts.display()))?;
    let hosts = inventory.host_refs();

    let output = OutputFormatter::new(std::io::stdout().is_terminal(), cli.verbosity());
    print!("{}", output.banner(cli.mode));

    let runner = HostComplianceRunner::new(
        Arc::new(inventory),
        Baseline::default(),
        cli.run_options(),
    );
    let report = runner.run_all(&hosts).await;

    print!("{}", output.report(&report));

    let exit_code = if report.is_compliant() {
        0
    } else {
        EXIT_NON_COMPLIANT
    };
    std::process::exit(exit_code);
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 3),
        )
        .with(env_filter)
        .init();
}
