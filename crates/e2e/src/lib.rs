//! Parabank E2E Test Framework
//!
//! This crate runs browser-driven end-to-end scenarios against the Parabank
//! demo bank and aggregates their outcomes into a report:
//! - Declares each suite's cases as embedded YAML scenarios
//! - Drives Playwright through a long-lived JSON-line bridge per test case
//! - Judges pages with explicit predicates instead of ad hoc string sniffing
//! - Folds case outcomes into suite results and a run summary
//! - Renders a self-contained HTML report
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  RunCoordinator (runner.rs)                 │
//! │    for entry in CATALOG:  factory(ctx) -> Suite             │
//! │      build error / panic  -> synthetic failed SuiteResult   │
//! │      suite.run()          -> SuiteResult                    │
//! │    -> RunSummary { suites, total_passed, total_failed }     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Suite (suite.rs)                                           │
//! │    for case in cases:  run_case(driver, case) -> outcome    │
//! │    SuiteTally::record(outcome) ... finish() -> SuiteResult  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  run_case (case.rs)                                         │
//! │    open session -> execute (catch_unwind) -> close session  │
//! │    error / panic -> failing CheckOutcome                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioCase (scenario.rs)                                 │
//! │    steps -> snapshot -> Expectation::judge -> Verdict       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserDriver / BrowserSession (driver.rs)                 │
//! │    PlaywrightDriver (playwright.rs), OfflineDriver          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!              render_html / write_report (report.rs)
//! ```

pub mod case;
pub mod catalog;
pub mod check;
pub mod config;
pub mod driver;
pub mod error;
pub mod offline;
pub mod playwright;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod screenshots;
pub mod suite;
pub mod target;

pub use case::{run_case, CaseContext, TestCase};
pub use catalog::CATALOG;
pub use check::{CheckOutcome, Expectation, PageSnapshot, Predicate, Verdict};
pub use config::RunnerConfig;
pub use driver::{BrowserDriver, BrowserSession};
pub use error::{E2eError, E2eResult};
pub use offline::OfflineDriver;
pub use playwright::PlaywrightDriver;
pub use report::{render_html, write_report, BuildStatus, ReportArtifact};
pub use runner::{RunContext, RunCoordinator, RunSummary, SuiteEntry};
pub use suite::{Suite, SuiteContext, SuiteResult};
