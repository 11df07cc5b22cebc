//! Test case boundary
//!
//! A test case gets its own browser session, runs to completion and yields
//! exactly one [`CheckOutcome`]. Errors and panics raised inside the case are
//! turned into a failing outcome here and never cross into the suite.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::check::{CheckOutcome, Verdict};
use crate::config::TargetConfig;
use crate::driver::{BrowserDriver, BrowserSession};
use crate::error::E2eResult;
use crate::screenshots::ScreenshotStore;

/// What a case may know about its surroundings
#[derive(Debug, Clone)]
pub struct CaseContext {
    /// Module id of the owning suite, used for screenshot layout
    pub module_id: String,
    pub target: TargetConfig,
    pub screenshots: ScreenshotStore,
}

impl CaseContext {
    pub fn screenshot_path(&self, case_id: &str, name: &str) -> PathBuf {
        self.screenshots.path_for(&self.module_id, case_id, name)
    }

    /// Capture a screenshot; failures are logged and otherwise ignored
    pub async fn capture(&self, session: &mut dyn BrowserSession, case_id: &str, name: &str) {
        let path = self.screenshot_path(case_id, name);
        match session.screenshot(&path).await {
            Ok(()) => debug!("[Screenshot] Saved: {}", path.display()),
            Err(e) => warn!("[Screenshot] {} not captured: {}", path.display(), e),
        }
    }
}

/// One scenario against the site under test
#[async_trait]
pub trait TestCase: Send + Sync {
    /// Stable identifier, e.g. `TC_BILL_02`
    fn id(&self) -> &str;

    fn title(&self) -> &str;

    /// Drive the session and decide the case. May return early with an error.
    async fn execute(
        &self,
        session: &mut dyn BrowserSession,
        ctx: &CaseContext,
    ) -> E2eResult<CheckOutcome>;
}

/// Run one case inside its own session and always produce one outcome.
///
/// The session is closed before this returns, whatever the case did.
pub async fn run_case(
    driver: &dyn BrowserDriver,
    case: &dyn TestCase,
    ctx: &CaseContext,
) -> CheckOutcome {
    info!("=== {}: {} ===", case.id(), case.title());

    let mut session = match driver.open().await {
        Ok(session) => session,
        Err(e) => {
            let outcome = CheckOutcome::fail(case.id(), format!("browser session: {}", e));
            log_outcome(&outcome);
            return outcome;
        }
    };

    let result = AssertUnwindSafe(case.execute(session.as_mut(), ctx))
        .catch_unwind()
        .await;

    let outcome = match result {
        Ok(Ok(outcome)) => CheckOutcome { label: case.id().to_string(), ..outcome },
        Ok(Err(e)) => {
            ctx.capture(session.as_mut(), case.id(), "error").await;
            CheckOutcome::fail(case.id(), e.to_string())
        }
        Err(panic) => CheckOutcome::fail(case.id(), format!("panicked: {}", panic_message(&*panic))),
    };

    if let Err(e) = session.close().await {
        warn!("{}: closing browser session failed: {}", case.id(), e);
    }

    log_outcome(&outcome);
    outcome
}

fn log_outcome(outcome: &CheckOutcome) {
    let detail = outcome.detail.as_deref().unwrap_or("");
    match outcome.verdict {
        Verdict::Pass => info!("✓ PASS: {} {}", outcome.label, detail),
        Verdict::Caveat => info!("⚠ PASS (caveat): {} {}", outcome.label, detail),
        Verdict::Fail => error!("✗ FAIL: {} {}", outcome.label, detail),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
