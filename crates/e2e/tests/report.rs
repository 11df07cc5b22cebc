//! HTML report rendering and writing
//!
//! Run with: cargo test --package parabank-e2e --test report

use chrono::{DateTime, Duration, Local, TimeZone};

use parabank_e2e::report::{publish, TIMESTAMP_FORMAT};
use parabank_e2e::screenshots::ScreenshotStore;
use parabank_e2e::{render_html, write_report, E2eError, RunSummary, SuiteResult};

fn at(secs: i64) -> DateTime<Local> {
    Local.timestamp_opt(1_760_000_000 + secs, 0).unwrap()
}

fn mixed_run() -> RunSummary {
    let mut summary = RunSummary::begin(at(0));
    summary.record(SuiteResult::from_counts("Login", "login", 5, 0));
    summary.record(SuiteResult::from_counts("Bill Pay", "billpay", 3, 2));
    summary.finish(at(0) + Duration::milliseconds(15_300))
}

#[test]
fn info_grid_shows_duration_and_screenshots() {
    let html = render_html(&mixed_run(), 42, at(60));

    assert!(html.contains("15.3 seconds"));
    assert!(html.contains("42 captured"));
    assert!(html.contains("2 suites"));
    assert!(html.contains("UNSTABLE"));
    assert!(html.contains("80.0%"));
}

#[test]
fn rendering_is_deterministic_for_a_fixed_time() {
    let summary = mixed_run();
    assert_eq!(render_html(&summary, 3, at(60)), render_html(&summary, 3, at(60)));
}

#[test]
fn only_the_timestamp_depends_on_render_time() {
    let summary = mixed_run();
    let first = render_html(&summary, 3, at(60));
    let second = render_html(&summary, 3, at(7_200));

    let stamp = |t: DateTime<Local>| t.format(TIMESTAMP_FORMAT).to_string();
    assert_ne!(first, second);
    assert_eq!(
        first.replace(&stamp(at(60)), "<stamp>"),
        second.replace(&stamp(at(7_200)), "<stamp>")
    );
}

#[test]
fn all_passing_run_renders_success() {
    let mut summary = RunSummary::begin(at(0));
    for (name, id) in [("A", "a"), ("B", "b"), ("C", "c")] {
        summary.record(SuiteResult::from_counts(name, id, 7, 0));
    }
    let html = render_html(&summary.finish(at(5)), 0, at(5));

    assert!(html.contains("SUCCESS"));
    assert!(html.contains("100.0%"));
    assert!(!html.contains("UNSTABLE"));
    assert!(!html.contains("rate-bar-fill rate-low"));
    assert_eq!(html.matches("rate-bar-fill rate-high").count(), 3);
}

#[test]
fn empty_suite_renders_zero_rate() {
    let mut summary = RunSummary::begin(at(0));
    summary.record(SuiteResult::from_counts("Empty", "empty", 0, 0));
    let html = render_html(&summary.finish(at(1)), 0, at(1));

    assert!(html.contains("0.0%"));
    assert!(html.contains("rate-bar-fill rate-low"));
    assert!(!html.contains("NaN"));
}

#[test]
fn write_overwrites_and_creates_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("reports/latest/test_report.html");

    write_report(&path, "first".to_string()).unwrap();
    let artifact = write_report(&path, "second".to_string()).unwrap();

    assert_eq!(artifact.path, path);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
}

#[test]
fn unwritable_destination_is_a_write_error() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let path = blocker.join("test_report.html");
    match write_report(&path, "<html></html>".to_string()) {
        Err(E2eError::Write { path: failed, .. }) => assert_eq!(failed, path),
        other => panic!("expected write error, got {:?}", other.map(|a| a.path)),
    }
}

#[test]
fn publish_counts_screenshots_on_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ScreenshotStore::new(tmp.path().join("screenshots"));
    for name in ["TC_LOGIN_01_form", "TC_LOGIN_02_error"] {
        let path = store.path_for("login", name, "shot");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"png").unwrap();
    }

    let report_path = tmp.path().join("test_report.html");
    let artifact = publish(&mixed_run(), &store, &report_path).unwrap();

    assert!(artifact.html.contains("2 captured"));
    assert_eq!(std::fs::read_to_string(report_path).unwrap(), artifact.html);
}
