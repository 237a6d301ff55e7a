//! Variable interpolation for compose documents
//!
//! Supported forms: `$VAR`, `${VAR}`, `${VAR:-default}`, `${VAR-default}`,
//! `${VAR:?message}`, `${VAR?message}`, `${VAR:+alt}`, `${VAR+alt}` and `$$`
//! for a literal dollar sign. Defaults and alternatives are interpolated
//! themselves, so `${A:-${B}}` works.

use crate::error::{ComposeError, Result};
use serde_yaml::Value;
use std::collections::BTreeMap;
use tracing::warn;

pub type Environment = BTreeMap<String, String>;

/// Interpolate every string scalar in a YAML tree. Mapping keys are left alone.
pub fn interpolate_value(value: &mut Value, env: &Environment) -> Result<()> {
    match value {
        Value::String(s) => {
            if s.contains('$') {
                *s = interpolate_str(s, env)?;
            }
        }
        Value::Sequence(items) => {
            for item in items {
                interpolate_value(item, env)?;
            }
        }
        Value::Mapping(map) => {
            for (_, item) in map.iter_mut() {
                interpolate_value(item, env)?;
            }
        }
        Value::Tagged(tagged) => interpolate_value(&mut tagged.value, env)?,
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}

/// Interpolate a single string.
pub fn interpolate_str(input: &str, env: &Environment) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
        } else if let Some(body) = after.strip_prefix('{') {
            let end = matching_brace(body)
                .ok_or_else(|| ComposeError::InterpolationSyntax(input.to_string()))?;
            out.push_str(&expand_braced(&body[..end], env, input)?);
            rest = &body[end + 1..];
        } else {
            let name_len = variable_name_len(after);
            if name_len == 0 || after.starts_with(|c: char| c.is_ascii_digit()) {
                out.push('$');
                rest = after;
            } else {
                out.push_str(&lookup(&after[..name_len], env));
                rest = &after[name_len..];
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn variable_name_len(s: &str) -> usize {
    s.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(s.len())
}

/// Index of the `}` closing a `${` whose body starts at `body`.
fn matching_brace(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(idx),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn expand_braced(inner: &str, env: &Environment, whole: &str) -> Result<String> {
    let name_len = variable_name_len(inner);
    if name_len == 0 {
        return Err(ComposeError::InterpolationSyntax(whole.to_string()));
    }
    let name = &inner[..name_len];
    let modifier = &inner[name_len..];
    let value = env.get(name).map(String::as_str);
    let set_and_non_empty = value.is_some_and(|v| !v.is_empty());

    if modifier.is_empty() {
        return Ok(lookup(name, env));
    }

    let (op, arg) = if let Some(arg) = modifier.strip_prefix(":-") {
        (":-", arg)
    } else if let Some(arg) = modifier.strip_prefix(":?") {
        (":?", arg)
    } else if let Some(arg) = modifier.strip_prefix(":+") {
        (":+", arg)
    } else if let Some(arg) = modifier.strip_prefix('-') {
        ("-", arg)
    } else if let Some(arg) = modifier.strip_prefix('?') {
        ("?", arg)
    } else if let Some(arg) = modifier.strip_prefix('+') {
        ("+", arg)
    } else {
        return Err(ComposeError::InterpolationSyntax(whole.to_string()));
    };

    match op {
        ":-" if set_and_non_empty => Ok(value.unwrap_or_default().to_string()),
        ":-" => interpolate_str(arg, env),
        "-" => match value {
            Some(v) => Ok(v.to_string()),
            None => interpolate_str(arg, env),
        },
        ":?" if set_and_non_empty => Ok(value.unwrap_or_default().to_string()),
        "?" if value.is_some() => Ok(value.unwrap_or_default().to_string()),
        ":?" | "?" => Err(ComposeError::Interpolation {
            variable: name.to_string(),
            message: interpolate_str(arg, env)?,
        }),
        ":+" if set_and_non_empty => interpolate_str(arg, env),
        "+" if value.is_some() => interpolate_str(arg, env),
        _ => Ok(String::new()),
    }
}

fn lookup(name: &str, env: &Environment) -> String {
    match env.get(name) {
        Some(value) => value.clone(),
        None => {
            warn!("The \"{}\" variable is not set. Defaulting to a blank string.", name);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_plain_and_braced_variables() {
        let env = env(&[("TAG", "1.25"), ("NAME", "web")]);
        assert_eq!(interpolate_str("nginx:$TAG", &env).unwrap(), "nginx:1.25");
        assert_eq!(interpolate_str("${NAME}-svc", &env).unwrap(), "web-svc");
    }

    #[test]
    fn test_defaults_distinguish_unset_from_empty() {
        let env = env(&[("EMPTY", "")]);
        assert_eq!(interpolate_str("${EMPTY:-x}", &env).unwrap(), "x");
        assert_eq!(interpolate_str("${EMPTY-x}", &env).unwrap(), "");
        assert_eq!(interpolate_str("${MISSING-x}", &env).unwrap(), "x");
    }

    #[test]
    fn test_nested_default() {
        let env = env(&[("B", "inner")]);
        assert_eq!(interpolate_str("${A:-${B}}", &env).unwrap(), "inner");
    }

    #[test]
    fn test_required_variable_fails() {
        let err = interpolate_str("${DB_PASSWORD:?must be set}", &Environment::new()).unwrap_err();
        match err {
            ComposeError::Interpolation { variable, message } => {
                assert_eq!(variable, "DB_PASSWORD");
                assert_eq!(message, "must be set");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_alternative_value() {
        let env = env(&[("DEBUG", "1")]);
        assert_eq!(interpolate_str("${DEBUG:+--verbose}", &env).unwrap(), "--verbose");
        assert_eq!(interpolate_str("${QUIET:+--quiet}", &env).unwrap(), "");
    }

    #[test]
    fn test_escaped_and_stray_dollars() {
        let env = Environment::new();
        assert_eq!(interpolate_str("cost: $$5", &env).unwrap(), "cost: $5");
        assert_eq!(interpolate_str("trailing $", &env).unwrap(), "trailing $");
        assert_eq!(interpolate_str("$1", &env).unwrap(), "$1");
    }

    #[test]
    fn test_unterminated_brace_is_a_syntax_error() {
        assert!(matches!(
            interpolate_str("${OOPS", &Environment::new()),
            Err(ComposeError::InterpolationSyntax(_))
        ));
    }

    #[test]
    fn test_value_tree_leaves_keys_alone() {
        let mut value: Value = serde_yaml::from_str("$KEY: ${VAL}\nlist: [$VAL]").unwrap();
        interpolate_value(&mut value, &env(&[("VAL", "v")])).unwrap();
        assert_eq!(value["$KEY"], Value::String("v".into()));
        assert_eq!(value["list"][0], Value::String("v".into()));
    }
}
