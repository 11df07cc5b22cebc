//! Playwright browser automation
//!
//! Each session is one `node` process running [`BRIDGE_SCRIPT`]: a small
//! Playwright host that reads one JSON command per line on stdin and answers
//! with one JSON line on stdout. The page lives as long as the process, so
//! state (cookies, the logged-in user) carries from one step to the next.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tracing::{debug, warn};

use crate::check::PageSnapshot;
use crate::driver::{BrowserDriver, BrowserSession, SelectChoice};
use crate::error::{E2eError, E2eResult};

/// Browser engine to launch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser: {}", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Per-action timeout enforced inside the browser
    pub action_timeout_ms: u64,

    /// Pause after navigations and clicks so the page can settle
    pub settle_ms: u64,

    /// Node executable
    pub node_binary: PathBuf,

    /// `NODE_PATH` for resolving the `playwright` package; defaults to `./node_modules`
    /// unless the environment already sets one
    pub node_path: Option<PathBuf>,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout_ms: 10_000,
            settle_ms: 500,
            node_binary: PathBuf::from("node"),
            node_path: None,
        }
    }
}

impl PlaywrightConfig {
    /// How long the Rust side waits for one bridge reply
    fn reply_timeout(&self) -> Duration {
        // navigation waits for load and then settles, both bounded by the action timeout
        Duration::from_millis(self.action_timeout_ms * 3 + self.settle_ms + 5_000)
    }
}

/// Line protocol host. Options arrive as a JSON document in `argv[2]`.
pub const BRIDGE_SCRIPT: &str = r#"
const readline = require('readline');
const playwright = require('playwright');

const reply = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');

(async () => {
  const opts = JSON.parse(process.argv[2]);
  const browser = await playwright[opts.browser].launch({ headless: opts.headless });
  const context = await browser.newContext({
    viewport: { width: opts.width, height: opts.height }
  });
  const page = await context.newPage();
  page.setDefaultTimeout(opts.timeout);

  const dialogs = [];
  page.on('dialog', async (dialog) => {
    dialogs.push(dialog.message());
    try { await dialog.dismiss(); } catch (e) {}
  });

  const settle = async () => {
    try { await page.waitForLoadState('load', { timeout: opts.timeout }); } catch (e) {}
    if (opts.settle > 0) { await page.waitForTimeout(opts.settle); }
  };

  reply({ ok: true, ready: true });

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    if (!line.trim()) continue;
    let cmd;
    try {
      cmd = JSON.parse(line);
    } catch (e) {
      reply({ ok: false, error: 'malformed command: ' + e.message });
      continue;
    }
    try {
      switch (cmd.op) {
        case 'goto':
          await page.goto(cmd.url);
          await settle();
          reply({ ok: true });
          break;
        case 'click':
          await page.click(cmd.selector);
          await settle();
          reply({ ok: true });
          break;
        case 'fill':
          await page.fill(cmd.selector, cmd.value);
          reply({ ok: true });
          break;
        case 'select':
          await page.selectOption(cmd.selector, cmd.option);
          reply({ ok: true });
          break;
        case 'wait':
          await page.waitForSelector(cmd.selector, { state: 'attached' });
          reply({ ok: true });
          break;
        case 'screenshot':
          await page.screenshot({ path: cmd.path, fullPage: true });
          reply({ ok: true });
          break;
        case 'snapshot': {
          const counts = {};
          for (const selector of cmd.selectors) {
            counts[selector] = await page.locator(selector).count();
          }
          reply({
            ok: true,
            url: page.url(),
            content: await page.content(),
            element_counts: counts,
            dialogs: dialogs
          });
          break;
        }
        case 'close':
          await browser.close();
          reply({ ok: true });
          process.exit(0);
        default:
          reply({ ok: false, error: 'unknown op: ' + cmd.op });
      }
    } catch (e) {
      reply({ ok: false, error: e.message });
    }
  }
  await browser.close();
})().catch((e) => {
  reply({ ok: false, error: e.message });
  process.exit(1);
});
"#;

/// Browser driver backed by Playwright under Node
pub struct PlaywrightDriver {
    config: PlaywrightConfig,
    available: OnceCell<bool>,
}

impl PlaywrightDriver {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self {
            config,
            available: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }

    /// `NODE_PATH` handed to node: the configured one, else the inherited
    /// environment, else `node_modules` under the working directory
    fn module_path(&self) -> Option<PathBuf> {
        resolve_node_path(
            self.config.node_path.as_deref(),
            std::env::var_os("NODE_PATH").is_some(),
            std::env::current_dir().ok(),
        )
    }

    fn node_command(&self, workdir: &Path) -> Command {
        let mut cmd = Command::new(&self.config.node_binary);
        cmd.current_dir(workdir);
        if let Some(node_path) = self.module_path() {
            cmd.env("NODE_PATH", node_path);
        }
        cmd
    }

    /// Check that node resolves `playwright` the same way the bridge will
    fn check_playwright_installed(&self) -> bool {
        let status = self
            .node_command(&std::env::temp_dir())
            .args(["-e", "require.resolve('playwright')"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        matches!(status, Ok(status) if status.success())
    }

    fn bridge_options(&self) -> Value {
        json!({
            "browser": self.config.browser.as_str(),
            "headless": self.config.headless,
            "width": self.config.viewport_width,
            "height": self.config.viewport_height,
            "timeout": self.config.action_timeout_ms,
            "settle": self.config.settle_ms,
        })
    }
}

#[async_trait]
impl BrowserDriver for PlaywrightDriver {
    fn name(&self) -> &str {
        self.config.browser.as_str()
    }

    fn ensure_available(&self) -> E2eResult<()> {
        if *self.available.get_or_init(|| self.check_playwright_installed()) {
            Ok(())
        } else {
            Err(E2eError::PlaywrightNotFound)
        }
    }

    async fn open(&self) -> E2eResult<Box<dyn BrowserSession>> {
        self.ensure_available()?;

        // Write bridge to temp dir; it stays alive as long as the session
        let workdir = tempfile::tempdir()?;
        let script_path = workdir.path().join("bridge.js");
        std::fs::write(&script_path, BRIDGE_SCRIPT)?;

        let mut cmd = TokioCommand::from(self.node_command(workdir.path()));
        cmd.arg(&script_path)
            .arg(self.bridge_options().to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            E2eError::Playwright(format!(
                "failed to spawn {}: {}",
                self.config.node_binary.display(),
                e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdout unavailable".to_string()))?;

        let mut session = PlaywrightSession {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            reply_timeout: self.config.reply_timeout(),
            closed: false,
            _workdir: workdir,
        };

        // First line is the readiness handshake (browser launched)
        session.read_reply("launch").await?;
        debug!("Playwright session ready ({})", self.config.browser.as_str());

        Ok(Box::new(session))
    }
}

fn resolve_node_path(
    configured: Option<&Path>,
    inherited: bool,
    cwd: Option<PathBuf>,
) -> Option<PathBuf> {
    match configured {
        Some(path) => Some(path.to_path_buf()),
        None if inherited => None,
        None => cwd.map(|dir| dir.join("node_modules")),
    }
}

/// A live Playwright page behind the bridge process
pub struct PlaywrightSession {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    reply_timeout: Duration,
    closed: bool,
    _workdir: tempfile::TempDir,
}

impl PlaywrightSession {
    async fn request(&mut self, step: &str, command: Value) -> E2eResult<Value> {
        if self.closed {
            return Err(E2eError::StepFailed {
                step: step.to_string(),
                reason: "session already closed".to_string(),
            });
        }

        let mut line = command.to_string();
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        self.read_reply(step).await
    }

    async fn read_reply(&mut self, step: &str) -> E2eResult<Value> {
        let line = match tokio::time::timeout(self.reply_timeout, self.stdout.next_line()).await {
            Ok(line) => line?,
            Err(_) => return Err(E2eError::Timeout(step.to_string())),
        };

        let line = line.ok_or_else(|| {
            E2eError::Playwright(format!("bridge exited while running '{}'", step))
        })?;

        let reply: Value = serde_json::from_str(&line)?;
        if reply.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            Ok(reply)
        } else {
            let reason = reply
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown bridge error")
                .to_string();
            Err(E2eError::StepFailed {
                step: step.to_string(),
                reason,
            })
        }
    }
}

#[async_trait]
impl BrowserSession for PlaywrightSession {
    async fn navigate(&mut self, url: &str) -> E2eResult<()> {
        self.request(&format!("navigate:{}", url), json!({ "op": "goto", "url": url }))
            .await
            .map(drop)
    }

    async fn click(&mut self, selector: &str) -> E2eResult<()> {
        self.request(
            &format!("click:{}", selector),
            json!({ "op": "click", "selector": selector }),
        )
        .await
        .map(drop)
    }

    async fn fill(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.request(
            &format!("fill:{}", selector),
            json!({ "op": "fill", "selector": selector, "value": value }),
        )
        .await
        .map(drop)
    }

    async fn select(&mut self, selector: &str, choice: &SelectChoice) -> E2eResult<()> {
        let option = match choice {
            SelectChoice::Value(v) => json!({ "value": v }),
            SelectChoice::Label(l) => json!({ "label": l }),
            SelectChoice::Index(i) => json!({ "index": i }),
        };
        self.request(
            &format!("select:{}", selector),
            json!({ "op": "select", "selector": selector, "option": option }),
        )
        .await
        .map(drop)
    }

    async fn wait_for(&mut self, selector: &str) -> E2eResult<()> {
        self.request(
            &format!("wait:{}", selector),
            json!({ "op": "wait", "selector": selector }),
        )
        .await
        .map(drop)
    }

    async fn screenshot(&mut self, path: &Path) -> E2eResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let path_str = path.to_string_lossy();
        self.request(
            &format!("screenshot:{}", path_str),
            json!({ "op": "screenshot", "path": path_str }),
        )
        .await
        .map(drop)
    }

    async fn snapshot(&mut self, selectors: &BTreeSet<String>) -> E2eResult<PageSnapshot> {
        let reply = self
            .request("snapshot", json!({ "op": "snapshot", "selectors": selectors }))
            .await?;
        Ok(serde_json::from_value(reply)?)
    }

    async fn close(&mut self) -> E2eResult<()> {
        if self.closed {
            return Ok(());
        }
        let result = self.request("close", json!({ "op": "close" })).await;
        self.closed = true;

        if let Err(e) = &result {
            warn!("Playwright bridge did not close cleanly: {}", e);
            let _ = self.child.kill().await;
        }
        let _ = self.child.wait().await;
        result.map(drop)
    }
}
