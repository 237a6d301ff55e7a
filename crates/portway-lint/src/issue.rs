//! Issues and the severity-partitioned result of a run

use crate::check::{CheckInfo, Finding, Severity};
use serde::Serialize;

/// A finding tied back to the check that produced it.
///
/// Severity is read from the originating check; an issue cannot carry its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub check: CheckInfo,
    pub service: String,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(check: CheckInfo, finding: Finding) -> Self {
        Self {
            check,
            service: finding.service,
            field: finding.field,
            message: finding.message,
            suggestion: finding.suggestion,
        }
    }

    pub fn code(&self) -> &'static str {
        self.check.code
    }

    pub fn severity(&self) -> Severity {
        self.check.severity
    }

    pub fn category(&self) -> &'static str {
        self.check.category
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub info: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an issue to the partition matching its check's severity.
    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity() {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
            Severity::Info => self.info.push(issue),
        }
    }

    pub fn partition(&self, severity: Severity) -> &[ValidationIssue] {
        match severity {
            Severity::Error => &self.errors,
            Severity::Warning => &self.warnings,
            Severity::Info => &self.info,
        }
    }

    pub fn total(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.info.len()
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// All issues: errors, then warnings, then info.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }

    /// The worst severity present, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        Severity::ALL
            .into_iter()
            .find(|severity| !self.partition(*severity).is_empty())
    }

    /// Decide the overall outcome. `force` lets a caller override blocking errors.
    pub fn outcome(&self, force: bool) -> Outcome {
        if self.is_clean() {
            Outcome::Clean
        } else if !self.has_errors() {
            Outcome::Passed
        } else if force {
            Outcome::Forced
        } else {
            Outcome::Failed
        }
    }
}

/// Overall verdict of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// No issues at all.
    Clean,
    /// Only warnings or informational issues.
    Passed,
    /// Errors present but overridden by the caller.
    Forced,
    /// Errors present.
    Failed,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed)
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}
