//! Suite aggregation and run coordination
//!
//! Run with: cargo test --package parabank-e2e --test aggregation

use std::sync::Arc;

use async_trait::async_trait;

use parabank_e2e::check::{CheckOutcome, Verdict};
use parabank_e2e::report::{BuildStatus, RateTier};
use parabank_e2e::{
    BrowserSession, CaseContext, E2eError, E2eResult, OfflineDriver, RunContext,
    RunCoordinator, RunnerConfig, Suite, SuiteContext, SuiteEntry, TestCase, CATALOG,
};

/// A case that always yields the same verdict
struct Fixed {
    id: String,
    verdict: Verdict,
}

/// A case that fails through an error
struct Erroring;

/// A case that panics
struct Panicking;

#[async_trait]
impl TestCase for Fixed {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        "fixed"
    }

    async fn execute(
        &self,
        session: &mut dyn BrowserSession,
        _ctx: &CaseContext,
    ) -> E2eResult<CheckOutcome> {
        session.navigate("https://bank.test/index.htm").await?;
        Ok(CheckOutcome::new(self.verdict, &self.id, None))
    }
}

#[async_trait]
impl TestCase for Erroring {
    fn id(&self) -> &str {
        "TC_ERR"
    }

    fn title(&self) -> &str {
        "erroring"
    }

    async fn execute(
        &self,
        _session: &mut dyn BrowserSession,
        _ctx: &CaseContext,
    ) -> E2eResult<CheckOutcome> {
        Err(E2eError::Timeout("#never".into()))
    }
}

#[async_trait]
impl TestCase for Panicking {
    fn id(&self) -> &str {
        "TC_PANIC"
    }

    fn title(&self) -> &str {
        "panicking"
    }

    async fn execute(
        &self,
        _session: &mut dyn BrowserSession,
        _ctx: &CaseContext,
    ) -> E2eResult<CheckOutcome> {
        panic!("case blew up")
    }
}

fn cases(passed: usize, failed: usize) -> Vec<Box<dyn TestCase>> {
    let pass = (0..passed).map(|i| (format!("TC_P{}", i), Verdict::Pass));
    let fail = (0..failed).map(|i| (format!("TC_F{}", i), Verdict::Fail));
    pass.chain(fail)
        .map(|(id, verdict)| Box::new(Fixed { id, verdict }) as Box<dyn TestCase>)
        .collect()
}

fn five_passing(ctx: &SuiteContext<'_>) -> E2eResult<Suite> {
    Ok(Suite::new(ctx, cases(5, 0)))
}

fn three_of_five(ctx: &SuiteContext<'_>) -> E2eResult<Suite> {
    Ok(Suite::new(ctx, cases(3, 2)))
}

fn seven_passing(ctx: &SuiteContext<'_>) -> E2eResult<Suite> {
    Ok(Suite::new(ctx, cases(7, 0)))
}

fn empty(ctx: &SuiteContext<'_>) -> E2eResult<Suite> {
    Ok(Suite::new(ctx, Vec::new()))
}

fn unavailable(ctx: &SuiteContext<'_>) -> E2eResult<Suite> {
    Err(E2eError::SuiteUnavailable {
        suite: ctx.name.to_string(),
        reason: "construction error".into(),
    })
}

fn panics_on_build(_ctx: &SuiteContext<'_>) -> E2eResult<Suite> {
    panic!("factory blew up")
}

fn misbehaving(ctx: &SuiteContext<'_>) -> E2eResult<Suite> {
    let mut list = cases(1, 0);
    list.push(Box::new(Erroring));
    list.push(Box::new(Panicking));
    list.extend(cases(1, 0));
    Ok(Suite::new(ctx, list))
}

fn coordinator(driver: &OfflineDriver, entries: Vec<SuiteEntry>) -> RunCoordinator {
    let tmp = std::env::temp_dir().join("parabank-e2e-aggregation");
    let mut config = RunnerConfig::default();
    config.output.screenshot_dir = tmp;
    let ctx = RunContext::new(Arc::new(driver.clone()), &config);
    RunCoordinator::new(entries, ctx)
}

#[tokio::test]
async fn login_and_billpay_give_unstable_run() {
    let driver = OfflineDriver::new();
    let summary = coordinator(
        &driver,
        vec![
            SuiteEntry::new("Login", "login", five_passing),
            SuiteEntry::new("BillPay", "billpay", three_of_five),
        ],
    )
    .run()
    .await;

    assert_eq!(summary.total_passed, 8);
    assert_eq!(summary.total_failed, 2);
    assert!((summary.overall_rate() - 80.0).abs() < 1e-9);
    assert_eq!(summary.build_status(), BuildStatus::Unstable);

    let names: Vec<_> = summary.suites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Login", "BillPay"]);
    assert!(summary.validate().is_ok());
}

#[tokio::test]
async fn empty_suite_has_zero_rate() {
    let driver = OfflineDriver::new();
    let summary = coordinator(&driver, vec![SuiteEntry::new("Empty", "empty", empty)])
        .run()
        .await;

    let suite = &summary.suites[0];
    assert_eq!(suite.total, 0);
    assert_eq!(suite.success_rate, 0.0);
    assert_eq!(summary.overall_rate(), 0.0);
    assert!(suite.error.is_none());
}

#[tokio::test]
async fn unavailable_suite_is_recorded_and_run_continues() {
    let driver = OfflineDriver::new();
    let summary = coordinator(
        &driver,
        vec![
            SuiteEntry::new("Login", "login", five_passing),
            SuiteEntry::new("Admin Page", "admin", unavailable),
            SuiteEntry::new("BillPay", "billpay", three_of_five),
        ],
    )
    .run()
    .await;

    assert_eq!(summary.suites.len(), 3);

    let broken = &summary.suites[1];
    assert_eq!(broken.name, "Admin Page");
    assert_eq!((broken.total, broken.passed, broken.failed), (1, 0, 1));
    assert_eq!(broken.success_rate, 0.0);
    assert!(broken.error.as_deref().unwrap().contains("construction error"));

    assert_eq!(summary.suites[2].total, 5);
    assert_eq!(summary.total_passed, 8);
    assert_eq!(summary.total_failed, 3);
}

#[tokio::test]
async fn panicking_factory_is_contained() {
    let driver = OfflineDriver::new();
    let summary = coordinator(
        &driver,
        vec![
            SuiteEntry::new("Broken", "broken", panics_on_build),
            SuiteEntry::new("Login", "login", five_passing),
        ],
    )
    .run()
    .await;

    assert_eq!(summary.suites[0].failed, 1);
    assert!(summary.suites[0].error.is_some());
    assert_eq!(summary.suites[1].passed, 5);
}

#[tokio::test]
async fn all_passing_run_is_success() {
    let driver = OfflineDriver::new();
    let summary = coordinator(
        &driver,
        vec![
            SuiteEntry::new("A", "a", seven_passing),
            SuiteEntry::new("B", "b", seven_passing),
            SuiteEntry::new("C", "c", seven_passing),
        ],
    )
    .run()
    .await;

    assert_eq!(summary.build_status(), BuildStatus::Success);
    assert!((summary.overall_rate() - 100.0).abs() < 1e-9);
    assert_eq!(summary.total_tests(), 21);
    for suite in &summary.suites {
        assert_eq!(RateTier::from_rate(suite.success_rate), RateTier::High);
    }
}

#[tokio::test]
async fn running_totals_grow_suite_by_suite() {
    let driver = OfflineDriver::new();
    let mut snapshots = Vec::new();
    let summary = coordinator(
        &driver,
        vec![
            SuiteEntry::new("Login", "login", five_passing),
            SuiteEntry::new("Admin Page", "admin", unavailable),
            SuiteEntry::new("BillPay", "billpay", three_of_five),
        ],
    )
    .run_with(|partial| snapshots.push((partial.suites.len(), partial.total_passed, partial.total_failed)))
    .await;

    assert_eq!(snapshots, [(1, 5, 0), (2, 5, 1), (3, 8, 3)]);
    assert!(summary.finished_at >= summary.started_at);
}

#[tokio::test]
async fn case_errors_and_panics_stay_inside_the_suite() {
    let driver = OfflineDriver::new();
    let summary = coordinator(&driver, vec![SuiteEntry::new("Mixed", "mixed", misbehaving)])
        .run()
        .await;

    let suite = &summary.suites[0];
    assert_eq!(suite.total, 4);
    assert_eq!(suite.passed, 2);
    assert_eq!(suite.failed, 2);

    let ids: Vec<_> = suite.cases.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["TC_P0", "TC_ERR", "TC_PANIC", "TC_P0"]);
    assert!(suite.cases[1].detail.as_deref().unwrap().contains("#never"));
    assert!(suite.cases[2].detail.as_deref().unwrap().contains("case blew up"));

    assert_eq!(driver.sessions_opened(), 4);
    assert_eq!(driver.sessions_closed(), 4);
}

#[tokio::test]
async fn caveats_count_as_passes() {
    fn with_caveat(ctx: &SuiteContext<'_>) -> E2eResult<Suite> {
        Ok(Suite::new(
            ctx,
            vec![
                Box::new(Fixed { id: "TC_1".into(), verdict: Verdict::Pass }),
                Box::new(Fixed { id: "TC_2".into(), verdict: Verdict::Caveat }),
            ],
        ))
    }

    let driver = OfflineDriver::new();
    let summary = coordinator(&driver, vec![SuiteEntry::new("Care", "care", with_caveat)])
        .run()
        .await;

    assert_eq!(summary.total_passed, 2);
    assert_eq!(summary.total_failed, 0);
    assert_eq!(summary.total_caveats(), 1);
    assert_eq!(summary.build_status(), BuildStatus::Success);
}

#[tokio::test]
async fn full_catalog_runs_offline() {
    let driver = OfflineDriver::new();
    let summary = coordinator(&driver, CATALOG.to_vec()).run().await;

    assert_eq!(summary.suites.len(), CATALOG.len());
    for (suite, entry) in summary.suites.iter().zip(CATALOG) {
        assert_eq!(suite.module_id, entry.module_id);
        assert!(suite.error.is_none(), "{}: {:?}", suite.name, suite.error);
        assert!(suite.total > 0);
    }
    assert_eq!(driver.sessions_opened(), summary.total_tests());
    assert_eq!(driver.sessions_opened(), driver.sessions_closed());
    assert!(summary.validate().is_ok());
}
