//! HTML report rendering
//!
//! [`render_html`] is a pure function of the summary, the screenshot count and
//! the render timestamp. [`write_report`] persists the document, replacing any
//! earlier report at the same path.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{E2eError, E2eResult};
use crate::runner::RunSummary;
use crate::screenshots::ScreenshotStore;
use crate::suite::SuiteResult;

/// Timestamp format of the report header
pub const TIMESTAMP_FORMAT: &str = "%B %d, %Y at %H:%M:%S";

/// Overall outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    Success,
    Unstable,
}

impl BuildStatus {
    pub fn from_failures(failed: usize) -> Self {
        if failed == 0 {
            BuildStatus::Success
        } else {
            BuildStatus::Unstable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::Success => "SUCCESS",
            BuildStatus::Unstable => "UNSTABLE",
        }
    }

    fn indicator_class(&self) -> &'static str {
        match self {
            BuildStatus::Success => "status-pass",
            BuildStatus::Unstable => "status-fail",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation bucket for a success rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateTier {
    High,
    MidHigh,
    MidLow,
    Low,
}

impl RateTier {
    /// Lower bounds are inclusive: 100, 75, 50
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 100.0 {
            RateTier::High
        } else if rate >= 75.0 {
            RateTier::MidHigh
        } else if rate >= 50.0 {
            RateTier::MidLow
        } else {
            RateTier::Low
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            RateTier::High => "rate-high",
            RateTier::MidHigh => "rate-mid-high",
            RateTier::MidLow => "rate-mid-low",
            RateTier::Low => "rate-low",
        }
    }
}

/// `PASS` when a suite had no failures, else `FAIL`
pub fn status_label(suite: &SuiteResult) -> &'static str {
    if suite.all_passed() {
        "PASS"
    } else {
        "FAIL"
    }
}

/// A rendered report and where it was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub path: PathBuf,
    pub html: String,
}

/// Render the full HTML document
pub fn render_html(
    summary: &RunSummary,
    screenshot_count: usize,
    rendered_at: DateTime<Local>,
) -> String {
    ReportView {
        summary,
        screenshot_count,
        rendered_at,
    }
    .to_string()
}

/// Write `html` to `path`, creating the parent directory and overwriting any existing file
pub fn write_report(path: &Path, html: String) -> E2eResult<ReportArtifact> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &html)
    };

    write().map_err(|source| E2eError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ReportArtifact {
        path: path.to_path_buf(),
        html,
    })
}

/// Count screenshots, render at the current time and write the report
pub fn publish(
    summary: &RunSummary,
    screenshots: &ScreenshotStore,
    path: &Path,
) -> E2eResult<ReportArtifact> {
    let count = screenshots.count();
    let artifact = write_report(path, render_html(summary, count, Local::now()))?;

    info!("Report saved to: {}", artifact.path.display());
    info!("Total Tests: {}", summary.total_tests());
    info!("Passed: {}", summary.total_passed);
    info!("Failed: {}", summary.total_failed);
    info!("Success Rate: {:.1}%", summary.overall_rate());
    Ok(artifact)
}

/// Escape text for HTML element and attribute content
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Circumference of the progress ring (r = 80)
const RING: f64 = 502.0;

struct ReportView<'a> {
    summary: &'a RunSummary,
    screenshot_count: usize,
    rendered_at: DateTime<Local>,
}

impl ReportView<'_> {
    fn write_head(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, "<html lang=\"en\">")?;
        writeln!(f, "<head>")?;
        writeln!(f, "    <meta charset=\"UTF-8\">")?;
        writeln!(
            f,
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
        )?;
        writeln!(f, "    <title>Parabank Test Report</title>")?;
        writeln!(f, "    <link href=\"{}\" rel=\"stylesheet\">", FONTS)?;
        writeln!(f, "    <style>{}</style>", STYLE)?;
        writeln!(f, "</head>")
    }

    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "        <div class=\"header\">")?;
        writeln!(f, "            <h1>PARABANK TEST REPORT</h1>")?;
        writeln!(f, "            <p class=\"subtitle\">Browser Automation Test Suite</p>")?;
        writeln!(
            f,
            "            <p class=\"timestamp\">{}</p>",
            self.rendered_at.format(TIMESTAMP_FORMAT)
        )?;
        writeln!(f, "        </div>")
    }

    fn write_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        let cards = [
            ("total", s.total_tests().to_string(), "Total Tests"),
            ("passed", s.total_passed.to_string(), "Passed"),
            ("failed", s.total_failed.to_string(), "Failed"),
            ("rate", format!("{:.1}%", s.overall_rate()), "Success Rate"),
        ];

        writeln!(f, "        <div class=\"summary-grid\">")?;
        for (class, value, label) in cards {
            writeln!(f, "            <div class=\"summary-card {}\">", class)?;
            writeln!(f, "                <div class=\"value\">{}</div>", value)?;
            writeln!(f, "                <div class=\"label\">{}</div>", label)?;
            writeln!(f, "            </div>")?;
        }
        writeln!(f, "        </div>")
    }

    fn write_progress(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        let rate = s.overall_rate();

        writeln!(f, "        <div class=\"progress-section\">")?;
        writeln!(f, "            <div class=\"circular-progress\">")?;
        writeln!(f, "                <svg viewBox=\"0 0 180 180\">")?;
        writeln!(
            f,
            "                    <defs><linearGradient id=\"grad\" x1=\"0%\" y1=\"0%\" x2=\"100%\" y2=\"0%\"><stop offset=\"0%\" style=\"stop-color:#00ff88\"/><stop offset=\"100%\" style=\"stop-color:#00f0ff\"/></linearGradient></defs>"
        )?;
        writeln!(f, "                    <circle class=\"bg\" cx=\"90\" cy=\"90\" r=\"80\"/>")?;
        writeln!(
            f,
            "                    <circle class=\"progress-ring\" cx=\"90\" cy=\"90\" r=\"80\" style=\"stroke-dashoffset: {:.1}\"/>",
            RING - RING * rate / 100.0
        )?;
        writeln!(f, "                </svg>")?;
        writeln!(
            f,
            "                <div class=\"percentage\"><div class=\"value\">{:.1}%</div><div class=\"label\">Success</div></div>",
            rate
        )?;
        writeln!(f, "            </div>")?;
        writeln!(f, "            <div class=\"progress-details\">")?;
        writeln!(f, "                <h3>Execution Summary</h3>")?;
        self.write_bar(f, "passed", "Passed", s.total_passed, rate)?;
        self.write_bar(f, "failed", "Failed", s.total_failed, 100.0 - rate)?;
        writeln!(f, "            </div>")?;
        writeln!(f, "        </div>")
    }

    fn write_bar(
        &self,
        f: &mut fmt::Formatter<'_>,
        class: &str,
        label: &str,
        count: usize,
        width: f64,
    ) -> fmt::Result {
        writeln!(f, "                <div class=\"progress-bar-container\">")?;
        writeln!(
            f,
            "                    <div class=\"progress-bar-label\"><span>{}</span><span class=\"num-{}\">{} tests</span></div>",
            label, class, count
        )?;
        writeln!(
            f,
            "                    <div class=\"progress-bar\"><div class=\"progress-bar-fill {}\" style=\"width: {:.1}%\"></div></div>",
            class, width
        )?;
        writeln!(f, "                </div>")
    }

    fn write_info(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        let status = s.build_status();

        writeln!(f, "        <div class=\"info-grid\">")?;
        writeln!(
            f,
            "            <div class=\"info-card\"><h4>Execution Time</h4><p>{:.1} seconds</p></div>",
            s.duration_seconds()
        )?;
        writeln!(
            f,
            "            <div class=\"info-card\"><h4>Test Suites</h4><p>{} suites</p></div>",
            s.suites.len()
        )?;
        writeln!(
            f,
            "            <div class=\"info-card\"><h4>Screenshots</h4><p>{} captured</p></div>",
            self.screenshot_count
        )?;
        writeln!(
            f,
            "            <div class=\"info-card\"><h4>Build Status</h4><p><span class=\"status-icon {}\"></span>{}</p></div>",
            status.indicator_class(),
            status
        )?;
        writeln!(f, "        </div>")
    }

    fn write_suites(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "        <div class=\"suites-section\">")?;
        writeln!(f, "            <h2>Test Suite Results</h2>")?;
        writeln!(f, "            <table class=\"suites-table\">")?;
        writeln!(f, "                <thead>")?;
        writeln!(
            f,
            "                    <tr><th>Suite</th><th>Module</th><th>Total</th><th>Passed</th><th>Failed</th><th>Rate</th><th>Status</th></tr>"
        )?;
        writeln!(f, "                </thead>")?;
        writeln!(f, "                <tbody>")?;
        for suite in &self.summary.suites {
            write_suite_row(f, suite)?;
        }
        writeln!(f, "                </tbody>")?;
        writeln!(f, "            </table>")?;
        writeln!(f, "        </div>")
    }
}

fn write_suite_row(f: &mut fmt::Formatter<'_>, suite: &SuiteResult) -> fmt::Result {
    let tier = RateTier::from_rate(suite.success_rate);
    let label = status_label(suite);
    let badge = if suite.all_passed() { "badge-passed" } else { "badge-failed" };

    writeln!(f, "                    <tr>")?;
    write!(f, "                        <td class=\"suite-name\">{}", html_escape(&suite.name))?;
    if let Some(error) = &suite.error {
        write!(f, "<div class=\"suite-error\">{}</div>", html_escape(error))?;
    }
    writeln!(f, "</td>")?;
    writeln!(
        f,
        "                        <td class=\"module-name\">{}</td>",
        html_escape(&suite.module_id)
    )?;
    writeln!(f, "                        <td class=\"num-total\">{}</td>", suite.total)?;
    write!(f, "                        <td class=\"num-passed\">{}", suite.passed)?;
    if suite.caveats > 0 {
        let noun = if suite.caveats == 1 { "caveat" } else { "caveats" };
        write!(f, " <span class=\"caveats\">({} {})</span>", suite.caveats, noun)?;
    }
    writeln!(f, "</td>")?;
    writeln!(f, "                        <td class=\"num-failed\">{}</td>", suite.failed)?;
    writeln!(
        f,
        "                        <td><div class=\"rate-bar\"><div class=\"rate-bar-fill {}\" style=\"width: {:.1}%\"></div></div><span class=\"rate-text\">{:.1}%</span></td>",
        tier.css_class(),
        suite.success_rate,
        suite.success_rate
    )?;
    writeln!(
        f,
        "                        <td><span class=\"badge {}\">{}</span></td>",
        badge, label
    )?;
    writeln!(f, "                    </tr>")
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_head(f)?;
        writeln!(f, "<body>")?;
        writeln!(f, "    <div class=\"bg-grid\"></div>")?;
        writeln!(f, "    <div class=\"container\">")?;
        self.write_header(f)?;
        self.write_summary(f)?;
        self.write_progress(f)?;
        self.write_info(f)?;
        self.write_suites(f)?;
        writeln!(f, "        <div class=\"footer\">")?;
        writeln!(
            f,
            "            <p><span class=\"brand\">PARABANK</span> End-to-End Test Automation</p>"
        )?;
        writeln!(f, "        </div>")?;
        writeln!(f, "    </div>")?;
        writeln!(f, "</body>")?;
        writeln!(f, "</html>")
    }
}

const FONTS: &str = "https://fonts.googleapis.com/css2?family=Orbitron:wght@400;700;900&amp;family=Rajdhani:wght@400;500;600;700&amp;family=JetBrains+Mono:wght@400;600&amp;display=swap";

const STYLE: &str = r#"
        :root {
            --bg-primary: #0a0e17; --bg-secondary: #111827; --bg-card: #1a2332;
            --accent-cyan: #00f0ff; --accent-green: #00ff88; --accent-red: #ff3366;
            --accent-yellow: #ffcc00; --accent-orange: #ff6b35; --accent-purple: #a855f7;
            --text-primary: #e2e8f0; --text-secondary: #94a3b8; --text-muted: #64748b;
            --border-color: #2d3748;
        }
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: 'Rajdhani', sans-serif; background: var(--bg-primary); color: var(--text-primary); min-height: 100vh; }
        .bg-grid {
            position: fixed; inset: 0; pointer-events: none;
            background-image: linear-gradient(rgba(0, 240, 255, 0.03) 1px, transparent 1px),
                              linear-gradient(90deg, rgba(0, 240, 255, 0.03) 1px, transparent 1px);
            background-size: 60px 60px;
        }
        .container { position: relative; z-index: 1; max-width: 1400px; margin: 0 auto; padding: 40px 20px; }
        .header {
            text-align: center; margin-bottom: 50px; padding: 50px 40px; border-radius: 24px;
            background: linear-gradient(135deg, rgba(26, 35, 50, 0.95), rgba(17, 24, 39, 0.95));
            border: 1px solid var(--accent-cyan); box-shadow: 0 0 30px rgba(0, 240, 255, 0.2);
        }
        .header h1 {
            font-family: 'Orbitron', monospace; font-size: 3rem; font-weight: 900; letter-spacing: 4px;
            background: linear-gradient(135deg, var(--accent-cyan), var(--accent-purple));
            -webkit-background-clip: text; -webkit-text-fill-color: transparent; background-clip: text;
        }
        .header .subtitle { color: var(--text-secondary); font-size: 1.3rem; letter-spacing: 3px; text-transform: uppercase; }
        .header .timestamp {
            display: inline-block; margin-top: 20px; padding: 8px 20px; border-radius: 30px;
            font-family: 'JetBrains Mono', monospace; color: var(--accent-cyan);
            background: rgba(0, 240, 255, 0.1); border: 1px solid rgba(0, 240, 255, 0.3);
        }
        .summary-grid, .info-grid { display: grid; grid-template-columns: repeat(4, 1fr); gap: 25px; margin-bottom: 50px; }
        @media (max-width: 900px) { .summary-grid, .info-grid { grid-template-columns: repeat(2, 1fr); } }
        .summary-card, .info-card, .progress-section, .suites-section {
            background: linear-gradient(135deg, var(--bg-card), var(--bg-secondary));
            border: 1px solid var(--border-color); border-radius: 20px;
        }
        .summary-card { padding: 35px 25px; text-align: center; }
        .summary-card .value { font-family: 'Orbitron', monospace; font-size: 3.2rem; font-weight: 800; margin-bottom: 10px; }
        .summary-card .label { color: var(--text-secondary); text-transform: uppercase; letter-spacing: 2px; }
        .summary-card.total .value { color: var(--accent-cyan); }
        .summary-card.passed .value { color: var(--accent-green); }
        .summary-card.failed .value { color: var(--accent-red); }
        .summary-card.rate .value { color: var(--accent-yellow); }
        .progress-section { padding: 40px; margin-bottom: 50px; display: flex; align-items: center; gap: 50px; }
        .circular-progress { position: relative; width: 180px; height: 180px; flex-shrink: 0; }
        .circular-progress svg { transform: rotate(-90deg); width: 180px; height: 180px; }
        .circular-progress .bg { fill: none; stroke: var(--bg-primary); stroke-width: 14; }
        .circular-progress .progress-ring { fill: none; stroke: url(#grad); stroke-width: 14; stroke-linecap: round; stroke-dasharray: 502; }
        .circular-progress .percentage { position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); text-align: center; }
        .circular-progress .percentage .value { font-family: 'Orbitron', monospace; font-size: 2.2rem; color: var(--accent-green); }
        .progress-details { flex: 1; }
        .progress-details h3 { font-family: 'Orbitron', monospace; margin-bottom: 25px; }
        .progress-bar-container { margin-bottom: 18px; }
        .progress-bar-label { display: flex; justify-content: space-between; margin-bottom: 8px; }
        .progress-bar { height: 12px; background: var(--bg-primary); border-radius: 10px; overflow: hidden; }
        .progress-bar-fill { height: 100%; border-radius: 10px; }
        .progress-bar-fill.passed { background: linear-gradient(90deg, #00ff88, #00cc6a); }
        .progress-bar-fill.failed { background: linear-gradient(90deg, #ff3366, #cc2952); }
        .info-card { padding: 22px; }
        .info-card h4 { font-family: 'JetBrains Mono', monospace; color: var(--text-muted); font-size: 0.75rem; text-transform: uppercase; margin-bottom: 10px; }
        .info-card p { font-size: 1.3rem; font-weight: 600; }
        .status-icon { display: inline-block; width: 12px; height: 12px; border-radius: 50%; margin-right: 8px; }
        .status-pass { background: var(--accent-green); box-shadow: 0 0 12px var(--accent-green); }
        .status-fail { background: var(--accent-red); box-shadow: 0 0 12px var(--accent-red); }
        .suites-section { padding: 40px; margin-bottom: 50px; }
        .suites-section h2 { font-family: 'Orbitron', monospace; margin-bottom: 30px; }
        .suites-table { width: 100%; border-collapse: separate; border-spacing: 0 8px; }
        .suites-table th {
            font-family: 'JetBrains Mono', monospace; background: var(--bg-primary); color: var(--text-muted);
            text-transform: uppercase; font-size: 0.75rem; padding: 14px 18px; text-align: left;
        }
        .suites-table td { padding: 18px; background: var(--bg-primary); }
        .suite-name { font-weight: 700; font-size: 1.1rem; color: var(--accent-cyan); }
        .suite-error { font-size: 0.8rem; font-weight: 400; color: var(--accent-red); }
        .module-name { font-family: 'JetBrains Mono', monospace; font-size: 0.85rem; color: var(--text-muted); }
        .num-total, .num-passed, .num-failed { font-family: 'JetBrains Mono', monospace; font-weight: 700; }
        .num-passed { color: var(--accent-green); }
        .num-failed { color: var(--accent-red); }
        .caveats { color: var(--accent-yellow); font-weight: 400; font-size: 0.8rem; }
        .badge { display: inline-block; padding: 6px 16px; border-radius: 20px; font-size: 0.8rem; font-weight: 700; letter-spacing: 1px; }
        .badge-passed { background: rgba(0, 255, 136, 0.15); color: var(--accent-green); border: 1px solid rgba(0, 255, 136, 0.3); }
        .badge-failed { background: rgba(255, 51, 102, 0.15); color: var(--accent-red); border: 1px solid rgba(255, 51, 102, 0.3); }
        .rate-bar { width: 100px; height: 8px; background: var(--bg-card); border-radius: 4px; overflow: hidden; display: inline-block; vertical-align: middle; margin-right: 10px; }
        .rate-bar-fill { height: 100%; border-radius: 4px; }
        .rate-high { background: linear-gradient(90deg, #00ff88, #00cc6a); }
        .rate-mid-high { background: linear-gradient(90deg, #ffcc00, #e6b800); }
        .rate-mid-low { background: linear-gradient(90deg, #ff6b35, #e65a2b); }
        .rate-low { background: linear-gradient(90deg, #ff3366, #cc2952); }
        .rate-text { font-family: 'JetBrains Mono', monospace; font-weight: 600; }
        .footer { text-align: center; padding: 30px 20px; color: var(--text-muted); }
        .footer .brand { font-family: 'Orbitron', monospace; color: var(--accent-cyan); }
    "#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn at(secs: i64) -> DateTime<Local> {
        Local.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test_case(100.0, RateTier::High ; "perfect")]
    #[test_case(99.9, RateTier::MidHigh ; "just below perfect")]
    #[test_case(75.0, RateTier::MidHigh ; "mid high lower bound")]
    #[test_case(74.9, RateTier::MidLow ; "just below mid high")]
    #[test_case(50.0, RateTier::MidLow ; "mid low lower bound")]
    #[test_case(49.9, RateTier::Low ; "just below mid low")]
    #[test_case(0.0, RateTier::Low ; "zero")]
    fn test_rate_tier(rate: f64, tier: RateTier) {
        assert_eq!(RateTier::from_rate(rate), tier);
    }

    #[test_case(0, BuildStatus::Success ; "no failures")]
    #[test_case(1, BuildStatus::Unstable ; "one failure")]
    fn test_build_status(failed: usize, status: BuildStatus) {
        assert_eq!(BuildStatus::from_failures(failed), status);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(&SuiteResult::from_counts("A", "a", 7, 0)), "PASS");
        assert_eq!(status_label(&SuiteResult::from_counts("B", "b", 6, 1)), "FAIL");
        assert_eq!(status_label(&SuiteResult::from_counts("C", "c", 0, 0)), "PASS");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_rows_follow_suite_order_and_escape_names() {
        let mut summary = RunSummary::begin(at(0));
        summary.record(SuiteResult::from_counts("Login", "login", 5, 0));
        summary.record(SuiteResult::synthetic_failure(
            "Bill <Pay>",
            "billpay",
            "driver missing",
        ));
        let html = render_html(&summary.finish(at(2)), 0, at(3));

        let login = html.find("<td class=\"suite-name\">Login").unwrap();
        let billpay = html.find("Bill &lt;Pay&gt;").unwrap();
        assert!(login < billpay);
        assert!(html.contains("<div class=\"suite-error\">driver missing</div>"));
        assert!(html.contains("<span class=\"badge badge-failed\">FAIL</span>"));
        assert!(html.contains("rate-bar-fill rate-low"));
        assert!(html.contains("UNSTABLE"));
    }

    #[test_case(1, "(1 caveat)" ; "single")]
    #[test_case(2, "(2 caveats)" ; "plural")]
    fn test_caveat_note(caveats: usize, note: &str) {
        let mut suite = SuiteResult::from_counts("Customer Care", "customer_care", 3, 0);
        suite.caveats = caveats;
        let mut summary = RunSummary::begin(at(0));
        summary.record(suite);
        let html = render_html(&summary.finish(at(1)), 0, at(1));
        assert!(html.contains(&format!("<span class=\"caveats\">{}</span>", note)));
    }

    #[test]
    fn test_timestamp_format() {
        let html = render_html(&RunSummary::begin(at(0)), 0, at(0));
        let expected = at(0).format(TIMESTAMP_FORMAT).to_string();
        assert!(html.contains(&format!("<p class=\"timestamp\">{}</p>", expected)));
        assert!(expected.contains(" at "));
    }
}
