//! Checks: predicates over observed page state and the outcomes they produce

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Everything a predicate is allowed to observe about the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Current page URL
    pub url: String,

    /// Page markup, as served after the last action
    pub content: String,

    /// Number of elements matching each requested selector
    #[serde(default)]
    pub element_counts: BTreeMap<String, usize>,

    /// Messages of JavaScript dialogs opened since the session started
    #[serde(default)]
    pub dialogs: Vec<String>,
}

impl PageSnapshot {
    /// Snapshot of a page with the given markup and nothing else
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Record the element count for a selector
    pub fn with_elements(mut self, selector: impl Into<String>, count: usize) -> Self {
        self.element_counts.insert(selector.into(), count);
        self
    }

    /// Record an opened dialog
    pub fn with_dialog(mut self, message: impl Into<String>) -> Self {
        self.dialogs.push(message.into());
        self
    }

    fn count(&self, selector: &str) -> usize {
        self.element_counts.get(selector).copied().unwrap_or(0)
    }
}

/// A condition on observable page state.
///
/// Text comparisons are case-insensitive over [`PageSnapshot::content`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Predicate {
    /// The page contains a token
    Contains { text: String },

    /// The page does not contain a token
    Lacks { text: String },

    /// The page contains at least one of several tokens
    ContainsAny { texts: Vec<String> },

    /// At least one element matches the selector
    ElementPresent { selector: String },

    /// No element matches the selector
    ElementAbsent { selector: String },

    /// At least `count` elements match the selector
    MinCount { selector: String, count: usize },

    /// A JavaScript dialog was opened (e.g. an injected `alert`)
    DialogOpened,

    /// Every sub-predicate holds (vacuously true when empty)
    All { of: Vec<Predicate> },

    /// Some sub-predicate holds (false when empty)
    Any { of: Vec<Predicate> },

    /// The sub-predicate does not hold
    Not { predicate: Box<Predicate> },
}

impl Predicate {
    pub fn contains(text: impl Into<String>) -> Self {
        Self::Contains { text: text.into() }
    }

    pub fn lacks(text: impl Into<String>) -> Self {
        Self::Lacks { text: text.into() }
    }

    pub fn element_present(selector: impl Into<String>) -> Self {
        Self::ElementPresent {
            selector: selector.into(),
        }
    }

    /// Evaluate against a snapshot
    pub fn holds(&self, page: &PageSnapshot) -> bool {
        match self {
            Predicate::Contains { text } => contains_ci(&page.content, text),
            Predicate::Lacks { text } => !contains_ci(&page.content, text),
            Predicate::ContainsAny { texts } => texts.iter().any(|t| contains_ci(&page.content, t)),
            Predicate::ElementPresent { selector } => page.count(selector) > 0,
            Predicate::ElementAbsent { selector } => page.count(selector) == 0,
            Predicate::MinCount { selector, count } => page.count(selector) >= *count,
            Predicate::DialogOpened => !page.dialogs.is_empty(),
            Predicate::All { of } => of.iter().all(|p| p.holds(page)),
            Predicate::Any { of } => of.iter().any(|p| p.holds(page)),
            Predicate::Not { predicate } => !predicate.holds(page),
        }
    }

    /// Element selectors whose counts a snapshot must carry for this predicate
    pub fn selectors(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_selectors(&mut out);
        out
    }

    fn collect_selectors(&self, out: &mut BTreeSet<String>) {
        match self {
            Predicate::ElementPresent { selector }
            | Predicate::ElementAbsent { selector }
            | Predicate::MinCount { selector, .. } => {
                out.insert(selector.clone());
            }
            Predicate::All { of } | Predicate::Any { of } => {
                for p in of {
                    p.collect_selectors(out);
                }
            }
            Predicate::Not { predicate } => predicate.collect_selectors(out),
            Predicate::Contains { .. }
            | Predicate::Lacks { .. }
            | Predicate::ContainsAny { .. }
            | Predicate::DialogOpened => {}
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Verdict of one test case.
///
/// `Caveat` marks a case that passed only because more than one observed
/// behaviour is accepted (e.g. "either a validation error appears or the
/// action silently succeeds"). It counts as a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Caveat,
    Fail,
}

impl Verdict {
    pub fn passed(self) -> bool {
        !matches!(self, Verdict::Fail)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Caveat => write!(f, "PASS (caveat)"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// One rule of an expectation: when `when` holds, the case gets `outcome`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub when: Predicate,
    pub outcome: Verdict,
    #[serde(default)]
    pub note: Option<String>,
}

/// An ordered verdict ladder: the first matching rule decides, else `otherwise`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expectation {
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default = "default_otherwise")]
    pub otherwise: Verdict,
    #[serde(default)]
    pub note: Option<String>,
}

fn default_otherwise() -> Verdict {
    Verdict::Fail
}

impl Expectation {
    /// Pass when `predicate` holds, fail otherwise
    pub fn require(predicate: Predicate) -> Self {
        Self {
            rules: vec![Rule {
                when: predicate,
                outcome: Verdict::Pass,
                note: None,
            }],
            otherwise: Verdict::Fail,
            note: None,
        }
    }

    /// Decide a verdict for the observed page, with the note of the deciding rule
    pub fn judge(&self, page: &PageSnapshot) -> (Verdict, Option<String>) {
        self.rules
            .iter()
            .find(|rule| rule.when.holds(page))
            .map(|rule| (rule.outcome, rule.note.clone()))
            .unwrap_or_else(|| (self.otherwise, self.note.clone()))
    }

    pub fn selectors(&self) -> BTreeSet<String> {
        self.rules.iter().flat_map(|r| r.when.selectors()).collect()
    }
}

/// Atomic result of one check: a verdict, a label, and optional diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub verdict: Verdict,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CheckOutcome {
    pub fn new(verdict: Verdict, label: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            verdict,
            label: label.into(),
            detail,
        }
    }

    pub fn pass(label: impl Into<String>) -> Self {
        Self::new(Verdict::Pass, label, None)
    }

    pub fn fail(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(Verdict::Fail, label, Some(detail.into()))
    }

    pub fn passed(&self) -> bool {
        self.verdict.passed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn billpay_page() -> PageSnapshot {
        PageSnapshot::with_content("<h1 class=\"title\">Bill Payment Complete</h1>")
            .with_elements("[name='amount']", 1)
            .with_elements(".error", 0)
    }

    #[test]
    fn test_text_predicates_ignore_case() {
        let page = billpay_page();
        assert!(Predicate::contains("payment complete").holds(&page));
        assert!(Predicate::lacks("internal error").holds(&page));
        assert!(!Predicate::lacks("BILL").holds(&page));
        assert!(Predicate::ContainsAny {
            texts: vec!["denied".into(), "COMPLETE".into()]
        }
        .holds(&page));
    }

    #[test]
    fn test_element_predicates_use_counts() {
        let page = billpay_page();
        assert!(Predicate::element_present("[name='amount']").holds(&page));
        assert!(Predicate::ElementAbsent { selector: ".error".into() }.holds(&page));
        // selectors never counted are treated as absent
        assert!(!Predicate::element_present("#unknown").holds(&page));
        assert!(!Predicate::MinCount { selector: "[name='amount']".into(), count: 2 }.holds(&page));
    }

    #[test]
    fn test_combinators() {
        let page = billpay_page().with_dialog("XSS");
        let all = Predicate::All {
            of: vec![Predicate::contains("bill"), Predicate::DialogOpened],
        };
        assert!(all.holds(&page));
        assert!(Predicate::All { of: vec![] }.holds(&page));
        assert!(!Predicate::Any { of: vec![] }.holds(&page));
        let not = Predicate::Not {
            predicate: Box::new(Predicate::DialogOpened),
        };
        assert!(!not.holds(&page));
    }

    #[test]
    fn test_selectors_are_collected_recursively() {
        let p = Predicate::Any {
            of: vec![
                Predicate::element_present(".error"),
                Predicate::Not {
                    predicate: Box::new(Predicate::MinCount { selector: "tr".into(), count: 1 }),
                },
                Predicate::contains("x"),
            ],
        };
        let selectors: Vec<_> = p.selectors().into_iter().collect();
        assert_eq!(selectors, vec![".error".to_string(), "tr".to_string()]);
    }

    #[test]
    fn test_expectation_first_matching_rule_wins() {
        let expect = Expectation {
            rules: vec![
                Rule {
                    when: Predicate::contains("an internal error has occurred"),
                    outcome: Verdict::Fail,
                    note: Some("server crashed".into()),
                },
                Rule {
                    when: Predicate::contains("error"),
                    outcome: Verdict::Pass,
                    note: None,
                },
            ],
            otherwise: Verdict::Caveat,
            note: Some("behaviour documented".into()),
        };

        let crashed = PageSnapshot::with_content("An internal error has occurred");
        assert_eq!(expect.judge(&crashed), (Verdict::Fail, Some("server crashed".into())));

        let validated = PageSnapshot::with_content("<span class=\"error\">required</span>");
        assert_eq!(expect.judge(&validated).0, Verdict::Pass);

        let silent = PageSnapshot::with_content("Transfer Complete!");
        assert_eq!(expect.judge(&silent), (Verdict::Caveat, Some("behaviour documented".into())));
    }

    #[test]
    fn test_caveat_counts_as_pass() {
        assert!(Verdict::Caveat.passed());
        assert!(!Verdict::Fail.passed());
        assert!(CheckOutcome::new(Verdict::Caveat, "TC", None).passed());
    }

    #[test]
    fn test_parse_predicate_yaml() {
        let yaml = r#"
check: any
of:
  - check: contains
    text: Welcome
  - check: min_count
    selector: span.error
    count: 1
"#;
        let p: Predicate = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            p,
            Predicate::Any {
                of: vec![
                    Predicate::contains("Welcome"),
                    Predicate::MinCount { selector: "span.error".into(), count: 1 },
                ]
            }
        );
    }
}
