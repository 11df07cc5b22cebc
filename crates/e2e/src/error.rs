//! Error types for E2E testing

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not resolvable from node. Install it under ./node_modules or set playwright.node_path")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Target site unreachable after {attempts} attempts: {url}")]
    TargetUnreachable { url: String, attempts: usize },

    #[error("Suite '{suite}' unavailable: {reason}")]
    SuiteUnavailable { suite: String, reason: String },

    #[error("Failed to write report to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write run summary to {}: {source}", path.display())]
    SummaryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid run summary: {0}")]
    InvalidSummary(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
