use crate::check::{Check, CheckInfo, Finding, Severity, ValidationContext};
use regex::Regex;
use std::sync::LazyLock;

static RFC1123_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("RFC1123 label pattern compiles")
});

static NON_ALPHANUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("separator pattern compiles"));

/// Whether `name` is a valid DNS label: lowercase alphanumerics and hyphens,
/// starting and ending with an alphanumeric.
pub fn is_rfc1123(name: &str) -> bool {
    RFC1123_LABEL.is_match(name)
}

/// Closest DNS label to `name`.
///
/// Lowercases, collapses every run of other characters into one hyphen and
/// trims hyphens from both ends. May return an empty string.
pub fn to_rfc1123(name: &str) -> String {
    let lower = name.to_lowercase();
    NON_ALPHANUMERIC_RUN
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// PW005: service keys that cannot be used as DNS names.
pub struct ServiceNameRfc1123;

impl ServiceNameRfc1123 {
    pub const INFO: CheckInfo = CheckInfo {
        code: "PW005",
        name: "Service Name Not RFC1123 Compliant",
        description: "Service names must be lowercase alphanumerics and hyphens, starting and ending with an alphanumeric",
        severity: Severity::Warning,
        category: "lint",
    };
}

impl Check for ServiceNameRfc1123 {
    fn info(&self) -> &CheckInfo {
        &Self::INFO
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Vec<Finding> {
        ctx.services()
            .filter(|(name, _)| !is_rfc1123(name))
            .map(|(name, _)| {
                let normalized = to_rfc1123(name);
                let suggestion = if normalized.is_empty() {
                    String::new()
                } else {
                    format!("Rename to \"{}\"", normalized)
                };
                Finding::new(
                    name,
                    format!("services.{}", name),
                    format!("Service name \"{}\" is not RFC1123 compliant", name),
                )
                .with_suggestion(suggestion)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Scope;
    use portway_compose::{ApplicationGraph, Service};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rfc1123_labels() {
        for valid in ["web", "a", "api-v2", "0cache9"] {
            assert!(is_rfc1123(valid), "{valid} should be valid");
        }
        for invalid in ["", "Web", "-web", "web-", "my_service", "db.primary"] {
            assert!(!is_rfc1123(invalid), "{invalid} should be invalid");
        }
    }

    #[test]
    fn test_normalization() {
        assert_eq!(to_rfc1123("My_Service!!"), "my-service");
        assert_eq!(to_rfc1123("__API__v2__"), "api-v2");
        assert_eq!(to_rfc1123("!!!"), "");
    }

    #[test]
    fn test_suggests_normalized_name() {
        let graph = ApplicationGraph::new("demo")
            .with_service(Service::new("My_Service!!"))
            .with_service(Service::new("web"));

        let findings = ServiceNameRfc1123.evaluate(&ValidationContext::new(&graph, &Scope::Global));

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "services.My_Service!!");
        assert_eq!(
            findings[0].suggestion.as_deref(),
            Some("Rename to \"my-service\"")
        );
    }

    #[test]
    fn test_no_suggestion_when_nothing_survives() {
        let graph = ApplicationGraph::new("demo").with_service(Service::new("___"));
        let findings = ServiceNameRfc1123.evaluate(&ValidationContext::new(&graph, &Scope::Global));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].suggestion.is_none());
    }
}
