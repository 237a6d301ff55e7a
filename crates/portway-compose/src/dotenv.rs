//! `.env` file support
//!
//! Only the subset compose files rely on in practice: `KEY=VALUE` lines,
//! an optional `export ` prefix, `#` comments and quoted values.

use crate::error::{ComposeError, Result};
use crate::interpolate::Environment;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Load `<dir>/.env`. A missing file yields an empty environment.
pub fn load_dotenv(dir: &Path) -> Result<Environment> {
    let path = dir.join(".env");
    if !path.is_file() {
        return Ok(Environment::new());
    }

    let content = fs::read_to_string(&path).map_err(|source| ComposeError::Read {
        path: path.clone(),
        source,
    })?;

    let env = parse_dotenv(&content);
    debug!("Loaded {} variables from {}", env.len(), path.display());
    Ok(env)
}

pub fn parse_dotenv(content: &str) -> Environment {
    let mut env = Environment::new();

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((key, value)) = line.split_once('=') else {
            warn!("Ignoring malformed .env line {}: {}", lineno + 1, line);
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            warn!("Ignoring .env line {} with an empty key", lineno + 1);
            continue;
        }

        env.insert(key.to_string(), parse_value(value.trim()));
    }

    env
}

fn parse_value(raw: &str) -> String {
    if let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        return inner
            .replace("\\n", "\n")
            .replace("\\t", "\t")
            .replace("\\\"", "\"");
    }
    if let Some(inner) = raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        return inner.to_string();
    }
    match raw.find(" #") {
        Some(idx) => raw[..idx].trim_end().to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_dotenv_forms() {
        let env = parse_dotenv(
            r#"
# comment
TAG=1.25
export REGION=eu-west-1
GREETING="hello\nworld"
RAW='$NOT_EXPANDED'
PORT=8080 # inline comment
broken line
"#,
        );

        assert_eq!(env["TAG"], "1.25");
        assert_eq!(env["REGION"], "eu-west-1");
        assert_eq!(env["GREETING"], "hello\nworld");
        assert_eq!(env["RAW"], "$NOT_EXPANDED");
        assert_eq!(env["PORT"], "8080");
        assert_eq!(env.len(), 5);
    }

    #[test]
    fn test_missing_dotenv_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_dotenv(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_load_dotenv_from_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".env"), "IMAGE_TAG=2.0\n").unwrap();
        let env = load_dotenv(dir.path()).unwrap();
        assert_eq!(env.get("IMAGE_TAG").map(String::as_str), Some("2.0"));
    }
}
