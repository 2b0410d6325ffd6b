//! Structured diagnostics emitted while resolving roles and accessible names.
//!
//! Every rule violation or ambiguity found during resolution is appended to a
//! plain `Vec<Diagnostic>` threaded through the engine as an output parameter.
//! The engine itself never deduplicates: records stay in discovery order so the
//! causal chain is visible when debugging. The top-level caller deduplicates
//! once, right before surfacing results.

use std::collections::BTreeMap;

use serde::Serialize;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
    Info,
    Minor,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
            Severity::Minor => write!(f, "minor"),
        }
    }
}

/// Reference material attached to a diagnostic (W3C/MDN pages, explainers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: &'static str,
    pub label: &'static str,
}

/// One finding about one element.
///
/// Carries a serialized opening tag and a stable locator so it can be shown
/// without re-querying the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub issue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub html: String,
    pub locator: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl Diagnostic {
    fn new(severity: Severity, issue: impl Into<String>, html: String, locator: String) -> Self {
        Self {
            severity,
            issue: issue.into(),
            message: None,
            html,
            locator,
            links: Vec::new(),
            data: BTreeMap::new(),
        }
    }

    pub fn error(issue: impl Into<String>, html: String, locator: String) -> Self {
        Self::new(Severity::Error, issue, html, locator)
    }

    pub fn warn(issue: impl Into<String>, html: String, locator: String) -> Self {
        Self::new(Severity::Warn, issue, html, locator)
    }

    pub fn info(issue: impl Into<String>, html: String, locator: String) -> Self {
        Self::new(Severity::Info, issue, html, locator)
    }

    pub fn minor(issue: impl Into<String>, html: String, locator: String) -> Self {
        Self::new(Severity::Minor, issue, html, locator)
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn link(mut self, href: &'static str, label: &'static str) -> Self {
        self.links.push(Link { href, label });
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Composite identity used for top-level deduplication.
    fn dedup_key(&self) -> (String, String) {
        let text = if self.issue.is_empty() {
            self.message.clone().unwrap_or_default()
        } else {
            self.issue.clone()
        };
        (self.html.clone(), text)
    }
}

/// Drop repeated findings, keeping the first occurrence of each
/// `(opening tag, issue-or-message)` pair. Only the top-level caller runs
/// this; mid-resolution the full ordered stream is preserved.
pub fn dedup(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut seen = std::collections::HashSet::new();
    diagnostics
        .into_iter()
        .filter(|d| seen.insert(d.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(issue: &str, html: &str) -> Diagnostic {
        Diagnostic::warn(issue, html.to_string(), "html > body".to_string())
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let diags = vec![
            diag("missing label", "<input>"),
            diag("missing label", "<input>"),
            diag("missing label", "<select>"),
        ];
        let deduped = dedup(diags);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].html, "<input>");
        assert_eq!(deduped[1].html, "<select>");
    }

    #[test]
    fn dedup_falls_back_to_message_for_info() {
        let a = Diagnostic::info("", "<img>".to_string(), "x".to_string())
            .message("redundant alt text");
        let b = Diagnostic::info("", "<img>".to_string(), "x".to_string())
            .message("redundant alt text");
        assert_eq!(dedup(vec![a, b]).len(), 1);
    }

    #[test]
    fn distinct_issues_survive() {
        let diags = vec![diag("a", "<p>"), diag("b", "<p>")];
        assert_eq!(dedup(diags).len(), 2);
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Severity::Minor).unwrap(),
            "\"minor\""
        );
    }
}
