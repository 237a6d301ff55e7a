//! CI environment detection

/// Variables set to `true` by common CI providers.
const CI_FLAGS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "TRAVIS",
    "CIRCLECI",
];

/// Whether the process runs under a CI provider.
pub fn is_ci() -> bool {
    is_ci_with(|name| std::env::var(name).ok())
}

/// [`is_ci`] against an arbitrary variable lookup.
pub fn is_ci_with<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let flagged = CI_FLAGS.iter().any(|name| {
        lookup(name).is_some_and(|value| value.eq_ignore_ascii_case("true") || value == "1")
    });
    flagged || lookup("BUILD_NUMBER").is_some_and(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_detects_providers() {
        assert!(is_ci_with(env(&[("GITHUB_ACTIONS", "true")])));
        assert!(is_ci_with(env(&[("CI", "TRUE")])));
        assert!(is_ci_with(env(&[("BUILD_NUMBER", "42")])));
    }

    #[test]
    fn test_plain_shell_is_not_ci() {
        assert!(!is_ci_with(env(&[])));
        assert!(!is_ci_with(env(&[("CI", "false"), ("BUILD_NUMBER", "")])));
    }
}
