//! deckhandctl - diagnostic CLI for the maritime operations platform.
//!
//! Wraps the diagnostic engine in four commands suitable for interactive
//! use and CI gating. Exit codes are non-zero whenever the underlying
//! report signals a blocking condition, so pipelines can gate on them.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use deckhandctl::commands::{self, InputPaths, PackageFormat, ReportFormat};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "deckhandctl")]
#[command(about = "Module health and integration diagnostics", long_about = None)]
#[command(version = VERSION)]
struct Cli {
    /// Module catalog override (defaults to the embedded catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Flow declarations override (defaults to the embedded set)
    #[arg(long, global = true)]
    flows: Option<PathBuf>,

    /// Reference material override (defaults to the embedded set)
    #[arg(long, global = true)]
    reference: Option<PathBuf>,

    /// Per-probe timeout for capability checks, in milliseconds
    #[arg(
        long,
        global = true,
        default_value_t = 2000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    probe_timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the module catalog into a diagnostic report
    Diagnose {
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Validate declared inter-module data flows
    ValidateIntegration {
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Probe live platform capabilities
    ProbeCapabilities {
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Assemble the full technical package
    Package {
        #[arg(long, value_enum, default_value_t = PackageFormat::Text)]
        format: PackageFormat,

        /// Write the package to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = InputPaths {
        catalog: cli.catalog,
        flows: cli.flows,
        reference: cli.reference,
        probe_timeout_ms: cli.probe_timeout_ms,
    };
    let inputs = commands::load_inputs(&paths)?;

    let code = match cli.command {
        Commands::Diagnose { format } => commands::diagnose::run(&inputs, format)?,
        Commands::ValidateIntegration { format } => commands::integration::run(&inputs, format)?,
        Commands::ProbeCapabilities { format } => commands::capabilities::run(&inputs, format).await?,
        Commands::Package { format, output } => {
            commands::package::run(&inputs, format, output.as_deref()).await?
        }
    };

    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_zero_probe_timeout_rejected() {
        let result = Cli::try_parse_from(["deckhandctl", "--probe-timeout-ms", "0", "diagnose"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_probe_timeout() {
        let cli = Cli::try_parse_from(["deckhandctl", "diagnose"]).unwrap();
        assert_eq!(cli.probe_timeout_ms, 2000);
    }
}
