//! Catalog of validation checks, keyed by check code
//!
//! The registry is built once at startup and handed to the engine
//! explicitly. Iteration over the underlying map is unordered; anything
//! user-visible goes through [`CheckRegistry::sorted`].

use crate::check::{Check, Severity};
use crate::checks;
use crate::error::{LintError, Result};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

#[derive(Default)]
pub struct CheckRegistry {
    checks: HashMap<&'static str, Box<dyn Check>>,
}

impl CheckRegistry {
    /// An empty registry, useful for running a hand-picked subset of checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in check.
    ///
    /// Panics if two built-in checks share a code.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for check in checks::builtin() {
            let code = check.code();
            let displaced = registry.insert(check);
            assert!(displaced.is_none(), "duplicate built-in check code {}", code);
        }
        registry
    }

    /// Insert a check, replacing any check with the same code. Returns the displaced check.
    pub fn register<C: Check + 'static>(&mut self, check: C) -> Option<Box<dyn Check>> {
        let displaced = self.insert(Box::new(check));
        if let Some(previous) = &displaced {
            warn!(
                "Check {} ({}) was replaced by a later registration",
                previous.code(),
                previous.info().name
            );
        }
        displaced
    }

    /// Insert a check, failing if its code is already taken.
    pub fn try_register<C: Check + 'static>(&mut self, check: C) -> Result<()> {
        let code = check.code();
        if self.checks.contains_key(code) {
            return Err(LintError::DuplicateCheck(code.to_string()));
        }
        self.insert(Box::new(check));
        Ok(())
    }

    fn insert(&mut self, check: Box<dyn Check>) -> Option<Box<dyn Check>> {
        self.checks.insert(check.code(), check)
    }

    /// Look a check up by its exact code.
    pub fn get(&self, code: &str) -> Option<&dyn Check> {
        self.checks.get(code).map(|check| check.as_ref())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.checks.contains_key(code)
    }

    /// The whole catalog. Iteration order is unspecified.
    pub fn get_all(&self) -> &HashMap<&'static str, Box<dyn Check>> {
        &self.checks
    }

    /// Every check, sorted by code.
    pub fn sorted(&self) -> Vec<&dyn Check> {
        let mut checks: Vec<&dyn Check> = self.checks.values().map(|c| c.as_ref()).collect();
        checks.sort_by_key(|check| check.code());
        checks
    }

    /// Codes of all checks with the given severity, sorted.
    pub fn codes_with_severity(&self, severity: Severity) -> Vec<&'static str> {
        self.sorted()
            .into_iter()
            .filter(|check| check.info().severity == severity)
            .map(|check| check.code())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.sorted().iter().map(|check| check.code()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{CheckInfo, Finding, ValidationContext};

    struct Fixed(CheckInfo);

    impl Check for Fixed {
        fn info(&self) -> &CheckInfo {
            &self.0
        }

        fn evaluate(&self, _ctx: &ValidationContext<'_>) -> Vec<Finding> {
            Vec::new()
        }
    }

    fn info(code: &'static str, name: &'static str) -> CheckInfo {
        CheckInfo {
            code,
            name,
            description: "",
            severity: Severity::Warning,
            category: "test",
        }
    }

    #[test]
    fn test_register_last_wins() {
        let mut registry = CheckRegistry::new();
        assert!(registry.register(Fixed(info("X001", "first"))).is_none());

        let displaced = registry.register(Fixed(info("X001", "second")));

        assert_eq!(displaced.map(|c| c.info().name), Some("first"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("X001").map(|c| c.info().name), Some("second"));
    }

    #[test]
    fn test_try_register_rejects_duplicates() {
        let mut registry = CheckRegistry::new();
        registry.try_register(Fixed(info("X001", "first"))).unwrap();

        let err = registry
            .try_register(Fixed(info("X001", "second")))
            .unwrap_err();

        assert!(matches!(err, LintError::DuplicateCheck(code) if code == "X001"));
        assert_eq!(registry.get("X001").map(|c| c.info().name), Some("first"));
    }

    #[test]
    fn test_get_is_exact_and_absent_is_none() {
        let registry = CheckRegistry::builtin();
        assert!(registry.get("PW001").is_some());
        assert!(registry.get("pw001").is_none());
        assert!(registry.get("PW999").is_none());
    }

    #[test]
    fn test_sorted_by_code() {
        let mut registry = CheckRegistry::new();
        for code in ["C3", "A1", "B2"] {
            registry.register(Fixed(info(code, code)));
        }
        let codes: Vec<_> = registry.sorted().iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec!["A1", "B2", "C3"]);
        assert_eq!(format!("{:?}", registry), r#"["A1", "B2", "C3"]"#);
    }

    #[test]
    fn test_builtin_catalog() {
        let registry = CheckRegistry::builtin();
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.codes_with_severity(Severity::Error), vec!["PW004"]);
        assert_eq!(
            registry.codes_with_severity(Severity::Warning),
            vec!["PW001", "PW002", "PW003", "PW005", "PW006"]
        );
    }
}
