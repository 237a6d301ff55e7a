//! Compose file references and their resolution
//!
//! A reference is one entry of an environment's `compose_files` list:
//!
//! - `compose.yaml` or `file:compose.yaml`, relative to the config directory
//! - `url:https://example.com/compose.yaml`
//! - `github:owner/repo/path/to/compose.yaml@ref`

use crate::config::{ConfigError, Result};
use portway_compose::ComposeSource;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

pub const GITHUB_RAW_BASE: &str = "https://raw.githubusercontent.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeRef {
    File(PathBuf),
    Url(String),
    Github {
        owner: String,
        repo: String,
        path: String,
        git_ref: String,
    },
}

impl ComposeRef {
    fn invalid(reference: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    fn parse_github(reference: &str, location_and_ref: &str) -> Result<Self> {
        let (location, git_ref) = location_and_ref
            .rsplit_once('@')
            .filter(|(_, git_ref)| !git_ref.is_empty())
            .ok_or_else(|| Self::invalid(reference, "expected owner/repo/path@ref"))?;

        let mut parts = location.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), Some(path))
                if !owner.is_empty() && !repo.is_empty() && !path.is_empty() =>
            {
                Ok(ComposeRef::Github {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    path: path.to_string(),
                    git_ref: git_ref.to_string(),
                })
            }
            _ => Err(Self::invalid(
                reference,
                "expected owner/repo/path with a file path inside the repository",
            )),
        }
    }

    /// Where a remote reference is downloaded from. `None` for local files.
    pub fn remote_url(&self, github_base: &str) -> Option<String> {
        match self {
            ComposeRef::File(_) => None,
            ComposeRef::Url(url) => Some(url.clone()),
            ComposeRef::Github {
                owner,
                repo,
                path,
                git_ref,
            } => Some(format!(
                "{}/{}/{}/{}/{}",
                github_base.trim_end_matches('/'),
                owner,
                repo,
                git_ref,
                path
            )),
        }
    }
}

impl FromStr for ComposeRef {
    type Err = ConfigError;

    fn from_str(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(Self::invalid(reference, "empty reference"));
        }

        let Some((scheme, rest)) = reference.split_once(':') else {
            return Ok(ComposeRef::File(PathBuf::from(reference)));
        };

        match scheme {
            // Windows drive letter, e.g. C:\app\compose.yaml
            _ if scheme.len() == 1 => Ok(ComposeRef::File(PathBuf::from(reference))),
            "file" => Ok(ComposeRef::File(PathBuf::from(rest))),
            "url" => {
                if rest.starts_with("http://") || rest.starts_with("https://") {
                    Ok(ComposeRef::Url(rest.to_string()))
                } else {
                    Err(Self::invalid(reference, "url references must be http(s)"))
                }
            }
            "github" => Self::parse_github(reference, rest),
            other => Err(Self::invalid(
                reference,
                format!("unknown type '{}' (expected file, url or github)", other),
            )),
        }
    }
}

impl fmt::Display for ComposeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeRef::File(path) => write!(f, "file:{}", path.display()),
            ComposeRef::Url(url) => write!(f, "url:{}", url),
            ComposeRef::Github {
                owner,
                repo,
                path,
                git_ref,
            } => write!(f, "github:{}/{}/{}@{}", owner, repo, path, git_ref),
        }
    }
}

/// Turns references into loadable compose sources.
pub struct ComposeResolver {
    client: reqwest::Client,
    base_dir: PathBuf,
    github_base: String,
}

impl ComposeResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("portway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ConfigError::Fetch {
                url: GITHUB_RAW_BASE.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            base_dir: base_dir.into(),
            github_base: GITHUB_RAW_BASE.to_string(),
        })
    }

    /// Download `github:` references from another host.
    pub fn with_github_base(mut self, base: impl Into<String>) -> Self {
        self.github_base = base.into();
        self
    }

    pub async fn resolve(&self, reference: &ComposeRef) -> Result<ComposeSource> {
        match reference {
            ComposeRef::File(path) => self.resolve_file(path),
            remote => {
                let url = remote
                    .remote_url(&self.github_base)
                    .ok_or_else(|| ComposeRef::invalid(&remote.to_string(), "not a remote reference"))?;
                let content = self.fetch(&url).await?;
                // Remote documents share the project's .env with local ones.
                Ok(ComposeSource::inline(remote.to_string(), content)
                    .with_working_dir(self.base_dir.clone()))
            }
        }
    }

    pub async fn resolve_all(&self, references: &[ComposeRef]) -> Result<Vec<ComposeSource>> {
        let mut sources = Vec::with_capacity(references.len());
        for reference in references {
            sources.push(self.resolve(reference).await?);
        }
        Ok(sources)
    }

    fn resolve_file(&self, path: &Path) -> Result<ComposeSource> {
        let full = self.base_dir.join(path);
        if !full.is_file() {
            return Err(ConfigError::MissingComposeFile(full));
        }
        debug!("Resolved compose file {}", full.display());
        Ok(ComposeSource::from_path(&full)?)
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        info!("Fetching compose file from {}", url);
        let fetch_error = |source| ConfigError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ConfigError::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(fetch_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_paths_and_drive_letters_are_files() {
        assert_eq!(
            "compose.yaml".parse::<ComposeRef>().unwrap(),
            ComposeRef::File("compose.yaml".into())
        );
        assert_eq!(
            "file:deploy/compose.yaml".parse::<ComposeRef>().unwrap(),
            ComposeRef::File("deploy/compose.yaml".into())
        );
        assert_eq!(
            r"C:\app\compose.yaml".parse::<ComposeRef>().unwrap(),
            ComposeRef::File(r"C:\app\compose.yaml".into())
        );
    }

    #[test]
    fn test_github_reference() {
        let reference: ComposeRef = "github:acme/infra/shop/compose.prod.yaml@v2"
            .parse()
            .unwrap();

        assert_eq!(
            reference.remote_url(GITHUB_RAW_BASE).as_deref(),
            Some("https://raw.githubusercontent.com/acme/infra/v2/shop/compose.prod.yaml")
        );
        assert_eq!(
            reference.to_string(),
            "github:acme/infra/shop/compose.prod.yaml@v2"
        );
    }

    #[test]
    fn test_rejected_references() {
        for bad in [
            "github:acme/infra@main",
            "github:acme/infra/compose.yaml",
            "url:ftp://example.com/compose.yaml",
            "s3:bucket/compose.yaml",
            "  ",
        ] {
            assert!(
                matches!(bad.parse::<ComposeRef>(), Err(ConfigError::InvalidReference { .. })),
                "{bad} should be rejected"
            );
        }
    }
}
