//! Runner configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};
use crate::playwright::PlaywrightConfig;

/// Configuration for the whole run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub target: TargetConfig,
    pub playwright: PlaywrightConfig,
    pub output: OutputConfig,
}

/// The site under test and the account used for logged-in scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Application root; relative scenario URLs are joined onto it
    pub base_url: String,
    pub username: String,
    pub password: String,

    /// How long the pre-run reachability probe keeps retrying
    pub probe_timeout_secs: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "https://parabank.parasoft.com/parabank".to_string(),
            username: "john".to_string(),
            password: "demo".to_string(),
            probe_timeout_secs: 15,
        }
    }
}

impl TargetConfig {
    /// Resolve a scenario URL: absolute URLs pass through, others join the base
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

/// Where run artifacts land
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub screenshot_dir: PathBuf,
    pub report_path: PathBuf,
    pub results_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            screenshot_dir: PathBuf::from("screenshots"),
            report_path: PathBuf::from("test_report.html"),
            results_path: PathBuf::from("test-results/run-summary.json"),
        }
    }
}

impl RunnerConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> E2eResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> E2eResult<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    E2eError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&text)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> E2eResult<()> {
        let url = &self.target.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(E2eError::Config(format!(
                "target.base_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        if self.playwright.action_timeout_ms == 0 {
            return Err(E2eError::Config(
                "playwright.action_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
