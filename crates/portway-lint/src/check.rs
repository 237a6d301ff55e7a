//! The contract every validation check satisfies

use crate::error::LintError;
use portway_compose::{ApplicationGraph, Service};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How serious an issue is. Fixed per check, never per issue.
///
/// Ordered so that `Error > Warning > Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Presentation order: errors first.
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }

    /// Whether an issue of this severity blocks submission.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Severity::Error),
            "WARNING" | "WARN" => Ok(Severity::Warning),
            "INFO" => Ok(Severity::Info),
            _ => Err(LintError::UnknownSeverity(s.to_string())),
        }
    }
}

/// Static metadata of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckInfo {
    /// Unique identifier, e.g. `PW001`. The registry key.
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    /// Free-form grouping tag such as `security` or `networking`.
    pub category: &'static str,
}

/// A single diagnostic as produced by a check, before the engine ties it to
/// the check that emitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Empty for project-wide findings.
    pub service: String,
    /// Dotted path to the offending configuration, e.g. `services.web.ports`.
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl Finding {
    pub fn new(
        service: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Finding for `services.<service>.<field>`.
    pub fn for_service(service: &str, field: &str, message: impl Into<String>) -> Self {
        Self::new(service, format!("services.{}.{}", service, field), message)
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        let suggestion = suggestion.into();
        self.suggestion = (!suggestion.is_empty()).then_some(suggestion);
        self
    }
}

/// Which part of the graph a run looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Scope {
    #[default]
    Global,
    Service(String),
}

/// Read-only input handed to every check.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub graph: &'a ApplicationGraph,
    pub scope: &'a Scope,
}

impl<'a> ValidationContext<'a> {
    pub fn new(graph: &'a ApplicationGraph, scope: &'a Scope) -> Self {
        Self { graph, scope }
    }

    /// Services in scope, keyed by compose key, in key order.
    pub fn services(&self) -> impl Iterator<Item = (&'a str, &'a Service)> + 'a {
        let scope = self.scope;
        self.graph
            .services
            .iter()
            .filter(move |(key, _)| match scope {
                Scope::Global => true,
                Scope::Service(name) => *key == name,
            })
            .map(|(key, service)| (key.as_str(), service))
    }
}

/// A validation rule.
///
/// `evaluate` must be a pure function of the context: the same graph always
/// yields the same findings in the same order, nothing is mutated, and a
/// check that does not apply returns no findings instead of failing.
pub trait Check: Send + Sync {
    fn info(&self) -> &CheckInfo;

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Vec<Finding>;

    fn code(&self) -> &'static str {
        self.info().code
    }
}
