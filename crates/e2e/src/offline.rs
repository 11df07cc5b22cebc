//! In-memory browser driver
//!
//! Serves canned pages keyed by URL and records every action. Used for
//! `--offline` dry runs of the catalog and for exercising the core without a
//! browser.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::check::PageSnapshot;
use crate::driver::{BrowserDriver, BrowserSession, SelectChoice};
use crate::error::{E2eError, E2eResult};

/// An action a session performed, as recorded by the offline driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedAction {
    Navigate(String),
    Click(String),
    Fill(String, String),
    Select(String, SelectChoice),
    Wait(String),
    Screenshot(PathBuf),
    Snapshot,
    Close,
}

#[derive(Debug, Default)]
struct Ledger {
    opened: usize,
    closed: usize,
    actions: Vec<RecordedAction>,
}

/// Browser driver that never leaves the process
#[derive(Clone, Default)]
pub struct OfflineDriver {
    pages: Arc<HashMap<String, PageSnapshot>>,
    fallback: Arc<PageSnapshot>,
    missing_selectors: Arc<BTreeSet<String>>,
    write_screenshots: bool,
    ledger: Arc<Mutex<Ledger>>,
}

impl OfflineDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` whenever the session last navigated to `url`
    pub fn with_page(mut self, url: impl Into<String>, page: PageSnapshot) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.into(), page);
        self
    }

    /// Serve `page` for every URL without a dedicated page
    pub fn with_fallback(mut self, page: PageSnapshot) -> Self {
        self.fallback = Arc::new(page);
        self
    }

    /// Make clicks, fills and waits on `selector` fail as if the element were missing
    pub fn with_missing(mut self, selector: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.missing_selectors).insert(selector.into());
        self
    }

    /// Write a placeholder file for each screenshot instead of only recording it
    pub fn writing_screenshots(mut self) -> Self {
        self.write_screenshots = true;
        self
    }

    pub fn sessions_opened(&self) -> usize {
        self.ledger.lock().opened
    }

    pub fn sessions_closed(&self) -> usize {
        self.ledger.lock().closed
    }

    pub fn actions(&self) -> Vec<RecordedAction> {
        self.ledger.lock().actions.clone()
    }
}

#[async_trait]
impl BrowserDriver for OfflineDriver {
    fn name(&self) -> &str {
        "offline"
    }

    fn ensure_available(&self) -> E2eResult<()> {
        Ok(())
    }

    async fn open(&self) -> E2eResult<Box<dyn BrowserSession>> {
        self.ledger.lock().opened += 1;
        Ok(Box::new(OfflineSession {
            driver: self.clone(),
            url: String::new(),
            closed: false,
        }))
    }
}

struct OfflineSession {
    driver: OfflineDriver,
    url: String,
    closed: bool,
}

impl OfflineSession {
    fn record(&self, action: RecordedAction) {
        debug!("offline: {:?}", action);
        self.driver.ledger.lock().actions.push(action);
    }

    fn require(&self, step: &str, selector: &str) -> E2eResult<()> {
        if self.closed {
            return Err(E2eError::StepFailed {
                step: format!("{}:{}", step, selector),
                reason: "session already closed".to_string(),
            });
        }
        if self.driver.missing_selectors.contains(selector) {
            return Err(E2eError::StepFailed {
                step: format!("{}:{}", step, selector),
                reason: "no element matches selector".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for OfflineSession {
    async fn navigate(&mut self, url: &str) -> E2eResult<()> {
        self.url = url.to_string();
        self.record(RecordedAction::Navigate(url.to_string()));
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> E2eResult<()> {
        self.require("click", selector)?;
        self.record(RecordedAction::Click(selector.to_string()));
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.require("fill", selector)?;
        self.record(RecordedAction::Fill(selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn select(&mut self, selector: &str, choice: &SelectChoice) -> E2eResult<()> {
        self.require("select", selector)?;
        self.record(RecordedAction::Select(selector.to_string(), choice.clone()));
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str) -> E2eResult<()> {
        self.require("wait", selector)?;
        self.record(RecordedAction::Wait(selector.to_string()));
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path) -> E2eResult<()> {
        self.record(RecordedAction::Screenshot(path.to_path_buf()));
        if self.driver.write_screenshots {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, b"offline")?;
        }
        Ok(())
    }

    async fn snapshot(&mut self, selectors: &BTreeSet<String>) -> E2eResult<PageSnapshot> {
        self.record(RecordedAction::Snapshot);
        let mut page = self
            .driver
            .pages
            .get(&self.url)
            .cloned()
            .unwrap_or_else(|| (*self.driver.fallback).clone());
        page.url = self.url.clone();
        for selector in selectors {
            page.element_counts.entry(selector.clone()).or_insert(0);
        }
        Ok(page)
    }

    async fn close(&mut self) -> E2eResult<()> {
        if !self.closed {
            self.closed = true;
            self.record(RecordedAction::Close);
            self.driver.ledger.lock().closed += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_page_for_last_url() {
        let driver = OfflineDriver::new()
            .with_page("https://bank/overview.htm", PageSnapshot::with_content("Accounts Overview"))
            .with_fallback(PageSnapshot::with_content("home"));

        let mut session = driver.open().await.unwrap();
        session.navigate("https://bank/overview.htm").await.unwrap();
        let page = session.snapshot(&BTreeSet::new()).await.unwrap();
        assert_eq!(page.content, "Accounts Overview");
        assert_eq!(page.url, "https://bank/overview.htm");

        session.navigate("https://bank/other.htm").await.unwrap();
        let page = session.snapshot(&BTreeSet::new()).await.unwrap();
        assert_eq!(page.content, "home");

        session.close().await.unwrap();
        assert_eq!(driver.sessions_opened(), 1);
        assert_eq!(driver.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn test_missing_selector_fails_action() {
        let driver = OfflineDriver::new().with_missing("#newAccountId");
        let mut session = driver.open().await.unwrap();
        assert!(session.click("#newAccountId").await.is_err());
        assert!(session.click("#other").await.is_ok());
    }
}
