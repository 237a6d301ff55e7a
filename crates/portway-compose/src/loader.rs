//! Loading compose documents into an [`ApplicationGraph`]

use crate::dotenv::load_dotenv;
use crate::error::{ComposeError, Result};
use crate::graph::ApplicationGraph;
use crate::interpolate::{interpolate_value, Environment};
use crate::merge::merge_documents;
use crate::raw::RawDocument;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One compose document, either read from disk or supplied in memory.
#[derive(Debug, Clone)]
pub struct ComposeSource {
    /// Where the document came from, used in error messages.
    pub origin: String,
    pub content: String,
    /// Directory that relative paths and `.env` are resolved against.
    pub working_dir: Option<PathBuf>,
}

impl ComposeSource {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ComposeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        Ok(Self {
            origin: path.display().to_string(),
            content,
            working_dir: absolute.parent().map(Path::to_path_buf),
        })
    }

    pub fn inline(origin: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            content: content.into(),
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Reads, interpolates, merges and normalizes compose documents.
#[derive(Debug, Clone, Default)]
pub struct ComposeLoader {
    env: Environment,
    use_os_env: bool,
    project_name: Option<String>,
}

impl ComposeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variables that take precedence over both the process environment and `.env`.
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env.extend(env);
        self
    }

    /// Interpolate against the process environment as well.
    pub fn with_os_env(mut self) -> Self {
        self.use_os_env = true;
        self
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    pub fn load_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<ApplicationGraph> {
        let sources = paths
            .iter()
            .map(ComposeSource::from_path)
            .collect::<Result<Vec<_>>>()?;
        self.load_sources(sources)
    }

    pub fn load_str(&self, yaml: &str) -> Result<ApplicationGraph> {
        self.load_sources(vec![ComposeSource::inline("<inline>", yaml)])
    }

    pub fn load_sources(&self, sources: Vec<ComposeSource>) -> Result<ApplicationGraph> {
        let first = sources.first().ok_or(ComposeError::NoSources)?;
        let working_dir = first.working_dir.clone();
        let env = self.environment(working_dir.as_deref())?;

        let mut merged = Value::Mapping(Default::default());
        for source in &sources {
            debug!("Loading compose document from {}", source.origin);
            let mut document: Value =
                serde_yaml::from_str(&source.content).map_err(|e| ComposeError::Yaml {
                    origin: source.origin.clone(),
                    source: e,
                })?;

            match document {
                Value::Null => continue,
                Value::Mapping(_) => {}
                _ => return Err(ComposeError::NotAMapping(source.origin.clone())),
            }

            interpolate_value(&mut document, &env)?;
            merge_documents(&mut merged, document);
        }

        let raw: RawDocument = serde_yaml::from_value(merged).map_err(|e| ComposeError::Yaml {
            origin: "merged compose document".to_string(),
            source: e,
        })?;

        let raw_services = raw.services.unwrap_or_default();
        if raw_services.is_empty() {
            return Err(ComposeError::NoServices);
        }

        let name = self
            .project_name
            .clone()
            .or(raw.name)
            .or_else(|| {
                working_dir
                    .as_deref()
                    .and_then(Path::file_name)
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .map(|n| normalize_project_name(&n))
            .unwrap_or_default();

        let mut graph = ApplicationGraph::new(name);
        for (key, service) in raw_services {
            let service = service.unwrap_or_default().normalize(&key)?;
            graph.services.insert(key, service);
        }
        graph.volumes = raw.volumes.unwrap_or_default().into_keys().collect();

        info!(
            "Loaded project '{}' with {} service(s)",
            graph.name,
            graph.services.len()
        );
        Ok(graph)
    }

    fn environment(&self, working_dir: Option<&Path>) -> Result<Environment> {
        let mut env = match working_dir {
            Some(dir) => load_dotenv(dir)?,
            None => Environment::new(),
        };
        if self.use_os_env {
            env.extend(std::env::vars());
        }
        env.extend(self.env.clone());
        Ok(env)
    }
}

/// Lowercase and keep only `[a-z0-9_-]`, the characters compose allows in project names.
pub fn normalize_project_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}
