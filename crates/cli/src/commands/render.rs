//! Render Command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use parabank_e2e::report;
use parabank_e2e::screenshots::ScreenshotStore;
use parabank_e2e::{BuildStatus, RunSummary, RunnerConfig};

use crate::commands::run::print_summary;
use crate::output::{print_info, OutputFormat};

#[derive(Args)]
pub struct RenderArgs {
    /// Saved run summary (defaults to output.results_path)
    #[arg(long)]
    results: Option<PathBuf>,

    /// Where to write the HTML report (defaults to output.report_path)
    #[arg(long)]
    report: Option<PathBuf>,
}

pub fn execute(args: RenderArgs, config: &RunnerConfig, format: OutputFormat) -> Result<BuildStatus> {
    let results = args.results.unwrap_or_else(|| config.output.results_path.clone());
    let report_path = args.report.unwrap_or_else(|| config.output.report_path.clone());

    let summary = RunSummary::load(&results)
        .with_context(|| format!("loading run summary from {}", results.display()))?;

    let screenshots = ScreenshotStore::new(&config.output.screenshot_dir);
    let artifact = report::publish(&summary, &screenshots, &report_path)?;

    print_summary(&summary, format);
    if matches!(format, OutputFormat::Table) {
        print_info(&format!("Report written to {}", artifact.path.display()));
    }
    Ok(summary.build_status())
}
