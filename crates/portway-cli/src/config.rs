//! Project configuration (`.portway.yaml`)
//!
//! ```yaml
//! app:
//!   id: 0190c6b5-...
//!   slug: shop
//! environments:
//!   production:
//!     compose_files:
//!       - compose.yaml
//!       - github:acme/infra/shop/compose.prod.yaml@main
//! ```

use crate::resolve::ComposeRef;
use portway_compose::ComposeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File names looked up in the project directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".portway.yaml", ".portway.yml"];

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No .portway.yaml or .portway.yml found in {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Environment '{name}' is not defined (available: {available})")]
    UnknownEnvironment { name: String, available: String },

    #[error("Invalid compose file reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("Compose file not found: {}", .0.display())]
    MissingComposeFile(PathBuf),

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch {url}: HTTP {status}")]
    FetchStatus { url: String, status: u16 },

    #[error(transparent)]
    Compose(#[from] ComposeError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub compose_files: Vec<String>,
}

impl EnvironmentConfig {
    /// Parse every configured compose file reference.
    pub fn references(&self) -> Result<Vec<ComposeRef>> {
        self.compose_files.iter().map(|r| r.parse()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(skip)]
    path: PathBuf,
    pub app: App,
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
}

impl ProjectConfig {
    /// Locate the configuration file in `dir`.
    pub fn find(dir: &Path) -> Result<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: ProjectConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.path = path.to_path_buf();
        debug!(
            "Loaded project config for '{}' with {} environment(s)",
            config.app.slug,
            config.environments.len()
        );
        Ok(config)
    }

    /// [`find`](Self::find) then [`load`](Self::load).
    pub fn discover(dir: &Path) -> Result<Self> {
        Self::load(&Self::find(dir)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory relative compose file references are resolved against.
    pub fn config_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    pub fn environment(&self, name: &str) -> Result<&EnvironmentConfig> {
        self.environments
            .get(name)
            .ok_or_else(|| ConfigError::UnknownEnvironment {
                name: name.to_string(),
                available: if self.environments.is_empty() {
                    "none".to_string()
                } else {
                    self.environments
                        .keys()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                },
            })
    }
}
