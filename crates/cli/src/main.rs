//! Parabank E2E CLI - Main Entry Point
//!
//! Runs the suite catalog against a Parabank deployment, writes the run
//! summary and HTML report, and maps the build status onto the exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use parabank_e2e::{BuildStatus, RunnerConfig};

mod commands;
mod output;

use commands::{list, render, run};

/// Exit code for a run that could not complete
const EXIT_FATAL: u8 = 2;

/// Parabank E2E - browser suites, run aggregation and HTML reporting
#[derive(Parser)]
#[command(name = "parabank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "PARABANK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the suite catalog and publish the report
    Run(run::RunArgs),

    /// List the suite catalog
    List,

    /// Re-render the HTML report from a saved run summary
    Render(render::RenderArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; stdout carries command output only
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match dispatch(cli).await {
        Ok(None) | Ok(Some(BuildStatus::Success)) => ExitCode::SUCCESS,
        Ok(Some(BuildStatus::Unstable)) => ExitCode::FAILURE,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Run the chosen command; commands that judge a run return its build status
async fn dispatch(cli: Cli) -> anyhow::Result<Option<BuildStatus>> {
    let config = RunnerConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("loading configuration from {}", path.display()),
        None => "building default configuration".to_string(),
    })?;

    let status = match cli.command {
        Commands::Run(args) => Some(run::execute(args, config, cli.format).await?),
        Commands::List => {
            list::execute(&config, cli.format)?;
            None
        }
        Commands::Render(args) => Some(render::execute(args, &config, cli.format)?),
    };
    Ok(status)
}
