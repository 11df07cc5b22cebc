//! Browser driver seam
//!
//! The core never talks to a browser directly. It opens one [`BrowserSession`]
//! per test case through a [`BrowserDriver`], acts on the page through it and
//! asks it for a [`PageSnapshot`] when a case needs a verdict.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::check::PageSnapshot;
use crate::error::E2eResult;

/// How to pick an option from a `<select>` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectChoice {
    Value(String),
    Label(String),
    Index(usize),
}

impl std::fmt::Display for SelectChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectChoice::Value(v) => write!(f, "value={}", v),
            SelectChoice::Label(l) => write!(f, "label={}", l),
            SelectChoice::Index(i) => write!(f, "index={}", i),
        }
    }
}

/// Factory for browser sessions
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fail if the browser backend cannot be used at all
    fn ensure_available(&self) -> E2eResult<()>;

    /// Open a fresh, isolated browser session
    async fn open(&self) -> E2eResult<Box<dyn BrowserSession>>;
}

/// One live browser: a single page plus its history of dialogs
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> E2eResult<()>;

    async fn click(&mut self, selector: &str) -> E2eResult<()>;

    async fn fill(&mut self, selector: &str, value: &str) -> E2eResult<()>;

    async fn select(&mut self, selector: &str, choice: &SelectChoice) -> E2eResult<()>;

    /// Wait until an element matching `selector` is attached
    async fn wait_for(&mut self, selector: &str) -> E2eResult<()>;

    async fn screenshot(&mut self, path: &Path) -> E2eResult<()>;

    /// Observe the page, counting elements for each selector in `selectors`
    async fn snapshot(&mut self, selectors: &BTreeSet<String>) -> E2eResult<PageSnapshot>;

    /// Release the browser. Called exactly once per session.
    async fn close(&mut self) -> E2eResult<()>;
}
