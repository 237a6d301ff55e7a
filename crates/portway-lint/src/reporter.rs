//! Validation report generation
//!
//! Turns a [`ValidationResult`] into a severity-grouped report and the
//! registry into a catalog listing. Both render as plain text or JSON; the
//! text form carries no colour so it can be compared byte for byte.

use crate::check::{CheckInfo, Severity};
use crate::error::{LintError, Result};
use crate::issue::{ValidationIssue, ValidationResult};
use crate::registry::CheckRegistry;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(LintError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    /// False when any error-severity issue is present.
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// 1-based position within the group.
    pub index: usize,
    pub code: &'static str,
    pub check: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub service: String,
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ReportEntry {
    fn new(index: usize, issue: &ValidationIssue) -> Self {
        Self {
            index,
            code: issue.code(),
            check: issue.check.name,
            category: issue.category(),
            severity: issue.severity(),
            service: issue.service.clone(),
            field: issue.field.clone(),
            message: issue.message.clone(),
            suggestion: issue.suggestion.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportGroup {
    pub severity: Severity,
    pub entries: Vec<ReportEntry>,
}

impl ReportGroup {
    pub fn title(&self) -> &'static str {
        match self.severity {
            Severity::Error => "Errors",
            Severity::Warning => "Warnings",
            Severity::Info => "Info",
        }
    }
}

/// Severity-grouped view of one validation run.
///
/// Groups appear as errors, warnings, info; empty groups are left out and
/// entries keep the order the engine produced them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub groups: Vec<ReportGroup>,
}

impl Report {
    pub fn from_result(result: &ValidationResult) -> Self {
        let groups = Severity::ALL
            .into_iter()
            .filter_map(|severity| {
                let issues = result.partition(severity);
                if issues.is_empty() {
                    return None;
                }
                let entries = issues
                    .iter()
                    .enumerate()
                    .map(|(i, issue)| ReportEntry::new(i + 1, issue))
                    .collect();
                Some(ReportGroup { severity, entries })
            })
            .collect();

        Self {
            summary: Summary {
                total: result.total(),
                errors: result.errors.len(),
                warnings: result.warnings.len(),
                info: result.info.len(),
                success: !result.has_errors(),
            },
            groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.total == 0
    }

    /// Generate the plain text report
    pub fn render_text(&self) -> String {
        self.to_string()
    }

    fn verdict(&self) -> &'static str {
        match self.groups.first().map(|group| group.severity) {
            Some(Severity::Error) => "Validation failed: errors must be fixed before deploying.",
            Some(Severity::Warning) => "Validation passed with warnings.",
            Some(Severity::Info) | None => "Validation passed.",
        }
    }

    /// Generate JSON report
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => self.to_json(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No issues found.");
        }

        writeln!(
            f,
            "Found {} issue(s): {} error(s), {} warning(s), {} info",
            self.summary.total, self.summary.errors, self.summary.warnings, self.summary.info
        )?;

        for group in &self.groups {
            writeln!(f, "\n{}:", group.title())?;
            for entry in &group.entries {
                writeln!(
                    f,
                    "  {}. [{}] {}: {}",
                    entry.index, entry.code, entry.check, entry.field
                )?;
                writeln!(f, "     {}", entry.message)?;
                if let Some(suggestion) = &entry.suggestion {
                    writeln!(f, "     Suggestion: {}", suggestion)?;
                }
            }
        }

        writeln!(f, "\n{}", self.verdict())
    }
}

/// Every registered check, sorted by code. Independent of any graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub checks: Vec<CheckInfo>,
}

impl Catalog {
    pub fn from_registry(registry: &CheckRegistry) -> Self {
        Self {
            checks: registry.sorted().into_iter().map(|check| *check.info()).collect(),
        }
    }

    pub fn render_text(&self) -> String {
        self.to_string()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => self.to_json(),
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const HEADER: [&str; 5] = ["CODE", "SEVERITY", "CATEGORY", "NAME", "DESCRIPTION"];

        let rows: Vec<[&str; 5]> = self
            .checks
            .iter()
            .map(|c| [c.code, c.severity.as_str(), c.category, c.name, c.description])
            .collect();

        // The last column is never padded.
        let mut widths = [0usize; 4];
        for row in std::iter::once(&HEADER).chain(rows.iter()) {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        for row in std::iter::once(&HEADER).chain(rows.iter()) {
            for (cell, width) in row.iter().zip(widths.iter()) {
                write!(f, "{:<width$}  ", cell, width = *width)?;
            }
            writeln!(f, "{}", row[4])?;
        }

        let warnings: Vec<&str> = self
            .checks
            .iter()
            .filter(|c| c.severity == Severity::Warning)
            .map(|c| c.code)
            .collect();
        if !warnings.is_empty() {
            writeln!(
                f,
                "\nWarning checks can be skipped with --skip-checks, e.g. --skip-checks {}",
                warnings.join(",")
            )?;
        }
        Ok(())
    }
}
