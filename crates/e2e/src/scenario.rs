//! Declarative YAML scenarios
//!
//! A suite document lists cases; each case is a sequence of browser steps
//! followed by an [`Expectation`] judged against the resulting page.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::case::{CaseContext, TestCase};
use crate::check::{CheckOutcome, Expectation};
use crate::config::TargetConfig;
use crate::driver::{BrowserSession, SelectChoice};
use crate::error::{E2eError, E2eResult};

/// Login form selectors shared by every logged-in scenario
pub const USERNAME_FIELD: &str = "input[name='username']";
pub const PASSWORD_FIELD: &str = "input[name='password']";
pub const LOGIN_BUTTON: &str = "input[value='Log In']";

/// All cases of one suite, parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteDocument {
    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Cases in execution order
    pub cases: Vec<CaseSpec>,
}

/// A single case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSpec {
    /// Unique id within the suite, e.g. `TC_LOGIN_01`
    pub id: String,

    pub title: String,

    /// Steps to execute in order
    #[serde(default)]
    pub steps: Vec<Step>,

    /// How the final page decides the verdict
    pub expect: Expectation,
}

/// A single step in a case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a URL (relative to the base URL unless absolute)
    Navigate { url: String },

    /// Open the home page and sign in with the configured credentials
    Login,

    /// Click an element
    Click { selector: String },

    /// Fill an input field, optionally with `value` repeated `repeat` times
    Fill {
        selector: String,
        value: String,
        #[serde(default)]
        repeat: Option<usize>,
    },

    /// Select an option from a dropdown
    Select {
        selector: String,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        index: Option<usize>,
    },

    /// Wait for an element to be attached
    Wait { selector: String },

    /// Wait for a fixed amount of time (use sparingly)
    Sleep { ms: u64 },

    /// Take a screenshot
    Screenshot { name: String },

    /// Log a message (for debugging)
    Log { message: String },
}

impl Step {
    /// Short name used in logs and step errors
    pub fn name(&self) -> String {
        match self {
            Step::Navigate { url } => format!("navigate:{}", url),
            Step::Login => "login".to_string(),
            Step::Click { selector } => format!("click:{}", selector),
            Step::Fill { selector, .. } => format!("fill:{}", selector),
            Step::Select { selector, .. } => format!("select:{}", selector),
            Step::Wait { selector } => format!("wait:{}", selector),
            Step::Sleep { ms } => format!("sleep:{}ms", ms),
            Step::Screenshot { name } => format!("screenshot:{}", name),
            Step::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }

    fn select_choice(&self) -> Option<SelectChoice> {
        match self {
            Step::Select { value, label, index, .. } => match (value, label, index) {
                (Some(v), None, None) => Some(SelectChoice::Value(v.clone())),
                (None, Some(l), None) => Some(SelectChoice::Label(l.clone())),
                (None, None, Some(i)) => Some(SelectChoice::Index(*i)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl SuiteDocument {
    /// Parse and validate a suite document
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let doc: Self = serde_yaml::from_str(yaml).map_err(E2eError::from)?;
        doc.validate()?;
        Ok(doc)
    }

    fn validate(&self) -> E2eResult<()> {
        if self.cases.is_empty() {
            return Err(E2eError::ScenarioParse("suite has no cases".to_string()));
        }

        let mut seen = HashSet::new();
        for case in &self.cases {
            if !seen.insert(case.id.as_str()) {
                return Err(E2eError::ScenarioParse(format!("duplicate case id {}", case.id)));
            }
            for step in &case.steps {
                if matches!(step, Step::Select { .. }) && step.select_choice().is_none() {
                    return Err(E2eError::ScenarioParse(format!(
                        "{}: {} needs exactly one of value, label or index",
                        case.id,
                        step.name()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Turn the document into runnable cases
    pub fn into_cases(self) -> Vec<Box<dyn TestCase>> {
        self.cases
            .into_iter()
            .map(|spec| Box::new(ScenarioCase::new(spec)) as Box<dyn TestCase>)
            .collect()
    }
}

/// Values substituted into step fields for one case execution
#[derive(Debug, Clone)]
pub struct Placeholders {
    username: String,
    password: String,
    unique: String,
}

impl Placeholders {
    pub fn new(target: &TargetConfig) -> Self {
        Self {
            username: target.username.clone(),
            password: target.password.clone(),
            unique: unique_username(),
        }
    }

    /// Replace `{{username}}`, `{{password}}` and `{{unique}}`
    pub fn apply(&self, text: &str) -> String {
        text.replace("{{username}}", &self.username)
            .replace("{{password}}", &self.password)
            .replace("{{unique}}", &self.unique)
    }
}

/// `testuser_` followed by 8 lowercase alphanumerics
pub fn unique_username() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("testuser_{}", suffix)
}

/// A test case backed by a [`CaseSpec`]
pub struct ScenarioCase {
    spec: CaseSpec,
}

impl ScenarioCase {
    pub fn new(spec: CaseSpec) -> Self {
        Self { spec }
    }

    async fn run_step(
        &self,
        step: &Step,
        session: &mut dyn BrowserSession,
        ctx: &CaseContext,
        vars: &Placeholders,
    ) -> E2eResult<()> {
        debug!("{}: {}", self.spec.id, step.name());

        match step {
            Step::Navigate { url } => session.navigate(&ctx.target.resolve(&vars.apply(url))).await,
            Step::Login => {
                session.navigate(&ctx.target.resolve("index.htm")).await?;
                session.fill(USERNAME_FIELD, &ctx.target.username).await?;
                session.fill(PASSWORD_FIELD, &ctx.target.password).await?;
                session.click(LOGIN_BUTTON).await
            }
            Step::Click { selector } => session.click(selector).await,
            Step::Fill { selector, value, repeat } => {
                let value = vars.apply(value).repeat(repeat.unwrap_or(1));
                session.fill(selector, &value).await
            }
            Step::Select { selector, .. } => {
                let choice = step.select_choice().ok_or_else(|| E2eError::StepFailed {
                    step: step.name(),
                    reason: "no option given".to_string(),
                })?;
                session.select(selector, &choice).await
            }
            Step::Wait { selector } => session.wait_for(selector).await,
            Step::Sleep { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(())
            }
            Step::Screenshot { name } => {
                ctx.capture(session, &self.spec.id, name).await;
                Ok(())
            }
            Step::Log { message } => {
                info!("[TEST LOG] {}", vars.apply(message));
                Ok(())
            }
        }
    }
}

#[async_trait]
impl TestCase for ScenarioCase {
    fn id(&self) -> &str {
        &self.spec.id
    }

    fn title(&self) -> &str {
        &self.spec.title
    }

    async fn execute(
        &self,
        session: &mut dyn BrowserSession,
        ctx: &CaseContext,
    ) -> E2eResult<CheckOutcome> {
        let vars = Placeholders::new(&ctx.target);

        for step in &self.spec.steps {
            self.run_step(step, session, ctx, &vars).await?;
        }

        let page = session.snapshot(&self.spec.expect.selectors()).await?;
        let (verdict, note) = self.spec.expect.judge(&page);
        Ok(CheckOutcome::new(verdict, self.spec.id.clone(), note))
    }
}
