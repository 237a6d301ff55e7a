//! Validation engine
//!
//! Runs every registered check that is not skipped, in code order, and
//! partitions the resulting issues by severity.

use crate::check::{Scope, ValidationContext};
use crate::error::{LintError, Result};
use crate::issue::{ValidationIssue, ValidationResult};
use crate::registry::CheckRegistry;
use portway_compose::ApplicationGraph;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Check codes to leave out of a run. Codes are trimmed and uppercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet {
    codes: BTreeSet<String>,
}

impl SkipSet {
    /// Parse a comma-separated list such as `"pw001, PW003"`.
    pub fn parse(list: &str) -> Self {
        list.split(',').collect()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(&code.trim().to_ascii_uppercase())
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    /// Codes that name no registered check. Skipping them is a no-op.
    pub fn unknown_codes(&self, registry: &CheckRegistry) -> Vec<&str> {
        self.codes()
            .filter(|code| {
                !registry
                    .get_all()
                    .keys()
                    .any(|registered| registered.eq_ignore_ascii_case(code))
            })
            .collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SkipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let codes = iter
            .into_iter()
            .map(|code| code.as_ref().trim().to_ascii_uppercase())
            .filter(|code| !code.is_empty())
            .collect();
        Self { codes }
    }
}

pub struct Engine<'r> {
    registry: &'r CheckRegistry,
}

impl<'r> Engine<'r> {
    pub fn new(registry: &'r CheckRegistry) -> Self {
        Self { registry }
    }

    /// Validate the whole graph.
    pub fn run(&self, graph: &ApplicationGraph, skip: &SkipSet) -> Result<ValidationResult> {
        self.run_scoped(graph, skip, &Scope::Global)
    }

    /// Validate the part of the graph selected by `scope`.
    pub fn run_scoped(
        &self,
        graph: &ApplicationGraph,
        skip: &SkipSet,
        scope: &Scope,
    ) -> Result<ValidationResult> {
        if let Scope::Service(name) = scope {
            if graph.service(name).is_none() {
                return Err(LintError::UnknownService(name.clone()));
            }
        }

        let ctx = ValidationContext::new(graph, scope);
        let mut result = ValidationResult::new();
        let mut executed = 0usize;

        for check in self.registry.sorted() {
            if skip.contains(check.code()) {
                debug!("Skipping check {}", check.code());
                continue;
            }

            let findings = check.evaluate(&ctx);
            debug!(
                "Check {} ({}) produced {} issue(s)",
                check.code(),
                check.info().name,
                findings.len()
            );
            executed += 1;

            let info = *check.info();
            for finding in findings {
                result.push(ValidationIssue::new(info, finding));
            }
        }

        info!(
            "Ran {} check(s): {} error(s), {} warning(s), {} info",
            executed,
            result.errors.len(),
            result.warnings.len(),
            result.info.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{Check, CheckInfo, Finding, Severity};
    use portway_compose::Service;

    #[test]
    fn test_skip_set_normalizes_codes() {
        let skip = SkipSet::parse(" pw001 ,PW003,, ");
        assert_eq!(skip.codes().collect::<Vec<_>>(), vec!["PW001", "PW003"]);
        assert!(skip.contains("pw003"));
        assert!(!skip.contains("PW002"));
    }

    #[test]
    fn test_unknown_skip_codes_are_reported_not_fatal() {
        let registry = CheckRegistry::builtin();
        let skip = SkipSet::parse("PW001,ZZ999");
        assert_eq!(skip.unknown_codes(&registry), vec!["ZZ999"]);

        let graph = ApplicationGraph::new("demo").with_service(Service::new("web").image("nginx:1"));
        assert!(Engine::new(&registry).run(&graph, &skip).is_ok());
    }

    #[test]
    fn test_lowercase_registered_code_is_not_unknown() {
        let mut registry = CheckRegistry::new();
        registry.register(every_service("x001", Severity::Warning));
        let skip = SkipSet::parse("X001");

        assert!(skip.unknown_codes(&registry).is_empty());

        let graph = ApplicationGraph::new("demo").with_service(Service::new("web"));
        let result = Engine::new(&registry).run(&graph, &skip).unwrap();
        assert!(result.is_clean());
    }

    struct EveryService(CheckInfo);

    impl Check for EveryService {
        fn info(&self) -> &CheckInfo {
            &self.0
        }

        fn evaluate(&self, ctx: &ValidationContext<'_>) -> Vec<Finding> {
            ctx.services()
                .map(|(name, _)| Finding::for_service(name, "image", self.0.code))
                .collect()
        }
    }

    fn every_service(code: &'static str, severity: Severity) -> EveryService {
        EveryService(CheckInfo {
            code,
            name: code,
            description: "",
            severity,
            category: "test",
        })
    }

    #[test]
    fn test_checks_run_in_code_order() {
        let mut registry = CheckRegistry::new();
        registry.register(every_service("B", Severity::Warning));
        registry.register(every_service("C", Severity::Warning));
        registry.register(every_service("A", Severity::Warning));

        let graph = ApplicationGraph::new("demo").with_service(Service::new("web"));
        let result = Engine::new(&registry).run(&graph, &SkipSet::default()).unwrap();

        let codes: Vec<_> = result.warnings.iter().map(|i| i.code()).collect();
        assert_eq!(codes, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_scoped_run() {
        let mut registry = CheckRegistry::new();
        registry.register(every_service("A", Severity::Info));
        let graph = ApplicationGraph::new("demo")
            .with_service(Service::new("api"))
            .with_service(Service::new("db"));
        let engine = Engine::new(&registry);

        let scoped = engine
            .run_scoped(&graph, &SkipSet::default(), &Scope::Service("db".into()))
            .unwrap();
        assert_eq!(scoped.info.len(), 1);
        assert_eq!(scoped.info[0].service, "db");

        let err = engine
            .run_scoped(&graph, &SkipSet::default(), &Scope::Service("cache".into()))
            .unwrap_err();
        assert!(matches!(err, LintError::UnknownService(name) if name == "cache"));
    }
}
