//! Run Command

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tracing::{info, warn};

use parabank_e2e::playwright::Browser;
use parabank_e2e::{
    catalog, report, target, BrowserDriver, BuildStatus, OfflineDriver, PlaywrightDriver,
    RunContext, RunCoordinator, RunSummary, RunnerConfig, SuiteResult,
};

use crate::output::{
    print_document, print_item, print_list, print_success, print_warning, OutputFormat,
    TableDisplay,
};

#[derive(Args)]
pub struct RunArgs {
    /// Only run these suites (module ids, repeatable)
    #[arg(short, long = "suite", value_name = "MODULE_ID")]
    suites: Vec<String>,

    /// Use the offline driver: no browser, no reachability probe
    #[arg(long)]
    offline: bool,

    /// Application root of the site under test
    #[arg(long, env = "PARABANK_BASE_URL")]
    base_url: Option<String>,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(long, env = "PARABANK_BROWSER")]
    browser: Option<Browser>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Where to write the HTML report
    #[arg(long)]
    report: Option<PathBuf>,

    /// Where to write the JSON run summary
    #[arg(long)]
    results: Option<PathBuf>,

    /// Screenshot root directory
    #[arg(long)]
    screenshots: Option<PathBuf>,
}

impl RunArgs {
    /// Layer command-line overrides onto the loaded configuration
    fn apply(&self, config: &mut RunnerConfig) {
        if let Some(url) = &self.base_url {
            config.target.base_url = url.clone();
        }
        if let Some(browser) = self.browser {
            config.playwright.browser = browser;
        }
        if self.headed {
            config.playwright.headless = false;
        }
        if let Some(path) = &self.report {
            config.output.report_path = path.clone();
        }
        if let Some(path) = &self.results {
            config.output.results_path = path.clone();
        }
        if let Some(path) = &self.screenshots {
            config.output.screenshot_dir = path.clone();
        }
    }
}

/// One suite line of the final summary
#[derive(Serialize)]
pub struct SuiteDisplay {
    pub name: String,
    pub module_id: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub caveats: usize,
    pub success_rate: f64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&SuiteResult> for SuiteDisplay {
    fn from(suite: &SuiteResult) -> Self {
        Self {
            name: suite.name.clone(),
            module_id: suite.module_id.clone(),
            total: suite.total,
            passed: suite.passed,
            failed: suite.failed,
            caveats: suite.caveats,
            success_rate: suite.success_rate,
            status: report::status_label(suite).to_string(),
            error: suite.error.clone(),
        }
    }
}

impl TableDisplay for SuiteDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Suite", "Module", "Total", "Passed", "Failed", "Caveats", "Rate", "Status"]
    }

    fn row(&self) -> Vec<String> {
        let status = if self.status == "PASS" {
            self.status.green().to_string()
        } else {
            self.status.red().to_string()
        };

        vec![
            self.name.clone(),
            self.module_id.clone(),
            self.total.to_string(),
            self.passed.to_string(),
            self.failed.to_string(),
            self.caveats.to_string(),
            format!("{:.1}%", self.success_rate),
            status,
        ]
    }
}

/// Run-wide totals
#[derive(Serialize)]
pub struct TotalsDisplay {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub caveats: usize,
    pub success_rate: f64,
    pub duration_seconds: f64,
    pub build_status: String,
}

impl From<&RunSummary> for TotalsDisplay {
    fn from(summary: &RunSummary) -> Self {
        Self {
            total: summary.total_tests(),
            passed: summary.total_passed,
            failed: summary.total_failed,
            caveats: summary.total_caveats(),
            success_rate: summary.overall_rate(),
            duration_seconds: summary.duration_seconds(),
            build_status: summary.build_status().to_string(),
        }
    }
}

impl TableDisplay for TotalsDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Total", "Passed", "Failed", "Caveats", "Rate", "Duration", "Build"]
    }

    fn row(&self) -> Vec<String> {
        let build = match self.failed {
            0 => self.build_status.green().bold().to_string(),
            _ => self.build_status.yellow().bold().to_string(),
        };

        vec![
            self.total.to_string(),
            self.passed.to_string(),
            self.failed.to_string(),
            self.caveats.to_string(),
            format!("{:.1}%", self.success_rate),
            format!("{:.1}s", self.duration_seconds),
            build,
        ]
    }
}

/// Whole-run document for machine-readable output
#[derive(Serialize)]
pub struct SummaryDisplay {
    pub suites: Vec<SuiteDisplay>,
    pub totals: TotalsDisplay,
}

impl From<&RunSummary> for SummaryDisplay {
    fn from(summary: &RunSummary) -> Self {
        Self {
            suites: summary.suites.iter().map(SuiteDisplay::from).collect(),
            totals: TotalsDisplay::from(summary),
        }
    }
}

/// Print the per-suite table, the totals and a closing status line.
///
/// JSON and YAML get a single document holding both.
pub fn print_summary(summary: &RunSummary, format: OutputFormat) {
    let display = SummaryDisplay::from(summary);

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            print_document(&display, format);
            return;
        }
        OutputFormat::Table | OutputFormat::Plain => {
            print_list(&display.suites, format);
            print_item(&display.totals, format);
        }
    }

    if !matches!(format, OutputFormat::Table) {
        return;
    }
    match summary.build_status() {
        BuildStatus::Success => print_success(&format!(
            "All {} tests passed",
            summary.total_tests()
        )),
        BuildStatus::Unstable => print_warning(&format!(
            "{} of {} tests failed",
            summary.total_failed,
            summary.total_tests()
        )),
    }
}

pub async fn execute(args: RunArgs, mut config: RunnerConfig, format: OutputFormat) -> Result<BuildStatus> {
    args.apply(&mut config);
    config.validate()?;

    let entries = catalog::select(&args.suites)?;

    info!("{}", "=".repeat(70));
    info!("PARABANK E2E TEST RUN - {} SUITES", entries.len());
    info!("{}", "=".repeat(70));
    info!("Target: {}", config.target.base_url);

    let driver: Arc<dyn BrowserDriver> = if args.offline {
        info!("Offline mode: scenarios run against the offline driver");
        Arc::new(OfflineDriver::new())
    } else {
        let probe_url = config.target.resolve("index.htm");
        let timeout = Duration::from_secs(config.target.probe_timeout_secs);
        if let Err(e) = target::wait_for_reachable(&probe_url, timeout).await {
            warn!("{}; running anyway", e);
        }
        info!("Browser: {}", config.playwright.browser.as_str());
        Arc::new(PlaywrightDriver::new(config.playwright.clone()))
    };

    let context = RunContext::new(driver, &config);
    let screenshots = context.screenshots.clone();
    let summary = RunCoordinator::new(entries, context).run().await;

    // Both writes are attempted; the report never waits on the summary
    let published = report::publish(&summary, &screenshots, &config.output.report_path);
    let saved = summary.save(&config.output.results_path);

    print_summary(&summary, format);

    published.context("publishing HTML report")?;
    saved.context("saving JSON run summary")?;
    Ok(summary.build_status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: RunArgs,
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let harness = Harness::parse_from([
            "run",
            "--suite",
            "login",
            "--suite",
            "billpay",
            "--base-url",
            "http://localhost:8080/parabank",
            "--browser",
            "firefox",
            "--headed",
            "--report",
            "out/report.html",
        ]);
        let mut config = RunnerConfig::default();
        harness.args.apply(&mut config);

        assert_eq!(harness.args.suites, ["login", "billpay"]);
        assert_eq!(config.target.base_url, "http://localhost:8080/parabank");
        assert_eq!(config.playwright.browser, Browser::Firefox);
        assert!(!config.playwright.headless);
        assert_eq!(config.output.report_path, PathBuf::from("out/report.html"));
        assert_eq!(
            config.output.results_path,
            RunnerConfig::default().output.results_path
        );
    }

    #[test]
    fn test_suite_row_marks_failures() {
        let suite = SuiteResult::from_counts("Bill Pay", "billpay", 3, 2);
        let row = SuiteDisplay::from(&suite);
        assert_eq!(row.status, "FAIL");
        assert_eq!(row.row()[6], "60.0%");
    }

    #[test]
    fn test_summary_document_holds_suites_and_totals() {
        let mut summary = RunSummary::begin(chrono::Local::now());
        summary.record(SuiteResult::from_counts("Login", "login", 5, 0));
        summary.record(SuiteResult::from_counts("Bill Pay", "billpay", 3, 2));

        let doc = serde_json::to_value(SummaryDisplay::from(&summary)).unwrap();
        assert_eq!(doc["suites"].as_array().unwrap().len(), 2);
        assert_eq!(doc["suites"][1]["status"], "FAIL");
        assert_eq!(doc["totals"]["passed"], 8);
        assert_eq!(doc["totals"]["build_status"], "UNSTABLE");
    }

    #[tokio::test]
    async fn test_report_written_when_results_path_is_unwritable() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let report_path = tmp.path().join("report.html");
        let results_path = blocker.join("run.json");
        let shots = tmp.path().join("shots");

        let harness = Harness::parse_from([
            "run",
            "--offline",
            "--suite",
            "login",
            "--results",
            results_path.to_str().unwrap(),
            "--report",
            report_path.to_str().unwrap(),
            "--screenshots",
            shots.to_str().unwrap(),
        ]);

        let err = execute(harness.args, RunnerConfig::default(), OutputFormat::Json)
            .await
            .unwrap_err();

        assert!(report_path.exists());
        let message = format!("{:#}", err);
        assert!(message.contains("run summary"), "{}", message);
        assert!(!message.contains("write report"), "{}", message);
    }
}
