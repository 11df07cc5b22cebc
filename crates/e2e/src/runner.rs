//! Run coordinator
//!
//! Executes an ordered catalog of suites exactly once each and accumulates a
//! [`RunSummary`]. A suite that cannot be built, or that panics while running,
//! is recorded as a single synthetic failure and the run moves on.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Local};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{RunnerConfig, TargetConfig};
use crate::driver::BrowserDriver;
use crate::error::{E2eError, E2eResult};
use crate::report::BuildStatus;
use crate::screenshots::ScreenshotStore;
use crate::suite::{success_rate, Suite, SuiteContext, SuiteResult};

/// Builds a suite for one catalog entry
pub type SuiteFactory = fn(&SuiteContext<'_>) -> E2eResult<Suite>;

/// One catalog line: display name, module id, factory
#[derive(Clone, Copy)]
pub struct SuiteEntry {
    pub name: &'static str,
    pub module_id: &'static str,
    pub factory: SuiteFactory,
}

impl SuiteEntry {
    pub const fn new(name: &'static str, module_id: &'static str, factory: SuiteFactory) -> Self {
        Self {
            name,
            module_id,
            factory,
        }
    }
}

impl std::fmt::Debug for SuiteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteEntry")
            .field("name", &self.name)
            .field("module_id", &self.module_id)
            .finish_non_exhaustive()
    }
}

/// Shared collaborators handed to every suite factory
#[derive(Clone)]
pub struct RunContext {
    pub driver: Arc<dyn BrowserDriver>,
    pub target: TargetConfig,
    pub screenshots: ScreenshotStore,
}

impl RunContext {
    pub fn new(driver: Arc<dyn BrowserDriver>, config: &RunnerConfig) -> Self {
        Self {
            driver,
            target: config.target.clone(),
            screenshots: ScreenshotStore::new(&config.output.screenshot_dir),
        }
    }
}

/// Aggregate of a whole run, suites in execution order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub suites: Vec<SuiteResult>,
    pub total_passed: usize,
    pub total_failed: usize,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl RunSummary {
    /// Empty summary for a run starting at `started_at`
    pub fn begin(started_at: DateTime<Local>) -> Self {
        Self {
            suites: Vec::new(),
            total_passed: 0,
            total_failed: 0,
            started_at,
            finished_at: started_at,
        }
    }

    /// Append a suite and bump the running totals
    pub fn record(&mut self, suite: SuiteResult) {
        self.total_passed += suite.passed;
        self.total_failed += suite.failed;
        self.suites.push(suite);
    }

    pub fn finish(mut self, finished_at: DateTime<Local>) -> Self {
        self.finished_at = finished_at;
        self
    }

    pub fn total_tests(&self) -> usize {
        self.total_passed + self.total_failed
    }

    pub fn total_caveats(&self) -> usize {
        self.suites.iter().map(|s| s.caveats).sum()
    }

    /// Overall pass percentage, 0 for an empty run
    pub fn overall_rate(&self) -> f64 {
        success_rate(self.total_passed, self.total_tests())
    }

    /// Wall-clock duration in seconds, never negative
    pub fn duration_seconds(&self) -> f64 {
        let millis = (self.finished_at - self.started_at).num_milliseconds().max(0);
        millis as f64 / 1000.0
    }

    pub fn build_status(&self) -> BuildStatus {
        BuildStatus::from_failures(self.total_failed)
    }

    /// Check per-suite invariants and that the totals match the suites
    pub fn validate(&self) -> E2eResult<()> {
        for suite in &self.suites {
            suite.validate()?;
        }

        let passed: usize = self.suites.iter().map(|s| s.passed).sum();
        let failed: usize = self.suites.iter().map(|s| s.failed).sum();
        if passed != self.total_passed || failed != self.total_failed {
            return Err(E2eError::InvalidSummary(format!(
                "totals {}/{} do not match suite sums {}/{}",
                self.total_passed, self.total_failed, passed, failed
            )));
        }
        Ok(())
    }

    /// Load a saved summary and re-check its invariants
    pub fn load(path: &Path) -> E2eResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let summary: Self = serde_json::from_str(&text)?;
        summary.validate()?;
        Ok(summary)
    }

    /// Write the summary as pretty JSON, creating parent directories.
    ///
    /// Fails with [`E2eError::SummaryWrite`], never the report's [`E2eError::Write`].
    pub fn save(&self, path: &Path) -> E2eResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)
        };
        write().map_err(|source| E2eError::SummaryWrite {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Results written to: {}", path.display());
        Ok(())
    }
}

/// Drives the catalog, one suite at a time
pub struct RunCoordinator {
    entries: Vec<SuiteEntry>,
    context: RunContext,
    summary: RunSummary,
}

impl RunCoordinator {
    /// The run's start time is taken here
    pub fn new(entries: impl IntoIterator<Item = SuiteEntry>, context: RunContext) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            context,
            summary: RunSummary::begin(Local::now()),
        }
    }

    pub fn entries(&self) -> &[SuiteEntry] {
        &self.entries
    }

    pub async fn run(self) -> RunSummary {
        self.run_with(|_| {}).await
    }

    /// Run every entry, calling `on_suite` with the partial summary after each one
    pub async fn run_with(mut self, mut on_suite: impl FnMut(&RunSummary)) -> RunSummary {
        let count = self.entries.len();

        for (index, entry) in self.entries.iter().enumerate() {
            info!("");
            info!("[{}/{}] Running {} tests...", index + 1, count, entry.name);

            let result = run_entry(entry, &self.context).await;
            if let Some(reason) = &result.error {
                error!("✗ {} could not run: {}", entry.name, reason);
            }

            self.summary.record(result);
            debug!(
                "Running totals: {} passed, {} failed",
                self.summary.total_passed, self.summary.total_failed
            );
            on_suite(&self.summary);
        }

        let summary = self.summary.finish(Local::now());
        info!("");
        info!(
            "Run finished: {}/{} passed ({:.1}%) in {:.1} seconds",
            summary.total_passed,
            summary.total_tests(),
            summary.overall_rate(),
            summary.duration_seconds()
        );
        summary
    }
}

/// Build and run one suite; any failure to do so yields a synthetic result
async fn run_entry(entry: &SuiteEntry, context: &RunContext) -> SuiteResult {
    let ctx = SuiteContext {
        name: entry.name,
        module_id: entry.module_id,
        run: context,
    };

    let suite = match panic::catch_unwind(AssertUnwindSafe(|| (entry.factory)(&ctx))) {
        Ok(Ok(suite)) => suite,
        Ok(Err(e)) => return SuiteResult::synthetic_failure(entry.name, entry.module_id, e.to_string()),
        Err(_) => {
            return SuiteResult::synthetic_failure(
                entry.name,
                entry.module_id,
                "suite construction panicked",
            )
        }
    };

    match AssertUnwindSafe(suite.run()).catch_unwind().await {
        Ok(result) => result,
        Err(_) => SuiteResult::synthetic_failure(entry.name, entry.module_id, "suite run panicked"),
    }
}
