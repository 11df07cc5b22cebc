//! Suite aggregation
//!
//! A suite runs its cases in declared order, one browser session per case,
//! and folds every [`CheckOutcome`] into a [`SuiteTally`]. The tally is a
//! plain value threaded through the loop and frozen into a [`SuiteResult`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::case::{run_case, CaseContext, TestCase};
use crate::check::{CheckOutcome, Verdict};
use crate::driver::BrowserDriver;
use crate::error::{E2eError, E2eResult};
use crate::runner::RunContext;
use crate::scenario::SuiteDocument;

/// Per-case line of a suite result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: String,
    pub title: String,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Outcome of one suite execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteResult {
    pub name: String,
    pub module_id: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,

    /// Passes that were accepted with a caveat; included in `passed`
    #[serde(default)]
    pub caveats: usize,

    /// Percentage in `0..=100`, 0 when no case ran
    pub success_rate: f64,

    #[serde(default)]
    pub cases: Vec<CaseRecord>,

    /// Set when the suite could not be built or run at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `passed / total * 100`, or 0 for an empty suite
pub fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64 * 100.0
    }
}

impl SuiteResult {
    /// Result built from bare counts
    pub fn from_counts(
        name: impl Into<String>,
        module_id: impl Into<String>,
        passed: usize,
        failed: usize,
    ) -> Self {
        let total = passed + failed;
        Self {
            name: name.into(),
            module_id: module_id.into(),
            total,
            passed,
            failed,
            caveats: 0,
            success_rate: success_rate(passed, total),
            cases: Vec::new(),
            error: None,
        }
    }

    /// Result built from per-case records
    pub fn from_cases(
        name: impl Into<String>,
        module_id: impl Into<String>,
        cases: Vec<CaseRecord>,
    ) -> Self {
        let passed = cases.iter().filter(|c| c.verdict.passed()).count();
        let caveats = cases.iter().filter(|c| c.verdict == Verdict::Caveat).count();
        let failed = cases.len() - passed;
        Self {
            caveats,
            cases,
            ..Self::from_counts(name, module_id, passed, failed)
        }
    }

    /// Stand-in for a suite that could not run: one failure, nothing passed
    pub fn synthetic_failure(
        name: impl Into<String>,
        module_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::from_counts(name, module_id, 0, 1)
        }
    }

    /// True when no case failed
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Check the count and rate invariants
    pub fn validate(&self) -> E2eResult<()> {
        if self.total != self.passed + self.failed {
            return Err(E2eError::InvalidSummary(format!(
                "{}: total {} != passed {} + failed {}",
                self.name, self.total, self.passed, self.failed
            )));
        }
        if self.caveats > self.passed {
            return Err(E2eError::InvalidSummary(format!(
                "{}: {} caveats exceed {} passes",
                self.name, self.caveats, self.passed
            )));
        }
        let expected = success_rate(self.passed, self.total);
        if !(0.0..=100.0).contains(&self.success_rate)
            || (self.success_rate - expected).abs() > 1e-6
        {
            return Err(E2eError::InvalidSummary(format!(
                "{}: success rate {} does not match {}/{}",
                self.name, self.success_rate, self.passed, self.total
            )));
        }
        Ok(())
    }
}

/// Accumulator for a suite in progress
#[derive(Debug, Clone, Default)]
pub struct SuiteTally {
    cases: Vec<CaseRecord>,
}

impl SuiteTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one case outcome into the tally
    pub fn record(mut self, title: &str, outcome: CheckOutcome) -> Self {
        self.cases.push(CaseRecord {
            id: outcome.label,
            title: title.to_string(),
            verdict: outcome.verdict,
            detail: outcome.detail,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn finish(self, name: &str, module_id: &str) -> SuiteResult {
        SuiteResult::from_cases(name, module_id, self.cases)
    }
}

/// What a suite factory receives from the coordinator
#[derive(Clone, Copy)]
pub struct SuiteContext<'a> {
    pub name: &'a str,
    pub module_id: &'a str,
    pub run: &'a RunContext,
}

impl SuiteContext<'_> {
    pub fn case_context(&self) -> CaseContext {
        CaseContext {
            module_id: self.module_id.to_string(),
            target: self.run.target.clone(),
            screenshots: self.run.screenshots.clone(),
        }
    }
}

/// A named, ordered set of cases bound to a browser driver
pub struct Suite {
    name: String,
    module_id: String,
    driver: Arc<dyn BrowserDriver>,
    context: CaseContext,
    cases: Vec<Box<dyn TestCase>>,
}

impl Suite {
    pub fn new(ctx: &SuiteContext<'_>, cases: Vec<Box<dyn TestCase>>) -> Self {
        Self {
            name: ctx.name.to_string(),
            module_id: ctx.module_id.to_string(),
            driver: Arc::clone(&ctx.run.driver),
            context: ctx.case_context(),
            cases,
        }
    }

    /// Build a suite from a YAML scenario document.
    ///
    /// Fails with [`E2eError::SuiteUnavailable`] when the browser driver cannot
    /// be used, so the coordinator can record the suite as unavailable.
    pub fn from_scenario(ctx: &SuiteContext<'_>, yaml: &str) -> E2eResult<Self> {
        ctx.run
            .driver
            .ensure_available()
            .map_err(|e| E2eError::SuiteUnavailable {
                suite: ctx.name.to_string(),
                reason: e.to_string(),
            })?;

        let doc = SuiteDocument::from_yaml(yaml)?;
        Ok(Self::new(ctx, doc.into_cases()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Run every case in order. Never fails: case errors become failing records.
    pub async fn run(&self) -> SuiteResult {
        let mut tally = SuiteTally::new();

        for case in &self.cases {
            let outcome = run_case(self.driver.as_ref(), case.as_ref(), &self.context).await;
            tally = tally.record(case.title(), outcome);
        }

        let result = tally.finish(&self.name, &self.module_id);

        if result.all_passed() {
            info!(
                "{}: {}/{} passed ({:.1}%)",
                result.name, result.passed, result.total, result.success_rate
            );
        } else {
            warn!(
                "{}: {}/{} passed ({:.1}%), {} failed",
                result.name, result.passed, result.total, result.success_rate, result.failed
            );
        }

        result
    }
}
