//! Control plane API client
//!
//! Only the calls the deploy flow needs. Every request carries the API key
//! in the `x-api-key` header.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "x-api-key";

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to the control plane failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Control plane returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("No organization is associated with this API key")]
    NoOrganization,
}

/// Body of a compose file submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeFileRequest {
    /// The normalized application graph as JSON.
    pub compose_normalized: serde_json::Value,
    /// The same graph rendered as YAML.
    pub compose_raw: String,
    pub version: String,
}

#[derive(Deserialize)]
struct Whoami {
    organization: Option<Organization>,
}

#[derive(Deserialize)]
struct Organization {
    slug: String,
}

#[derive(Deserialize)]
struct Created {
    id: Uuid,
}

#[derive(Deserialize)]
struct Deployed {
    #[serde(default)]
    deployments: Vec<Created>,
}

#[derive(Serialize)]
struct AppRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("portway/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.header(API_KEY_HEADER, &self.api_key).send().await?;
        let status = response.status();
        debug!("Control plane answered {} for {}", status, response.url());
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Slug of the organization owning the API key.
    pub async fn whoami(&self) -> Result<String> {
        let whoami: Whoami = self
            .send(self.client.get(self.url("/api/v1/whoami")))
            .await?;
        whoami
            .organization
            .map(|org| org.slug)
            .ok_or(ApiError::NoOrganization)
    }

    /// Create the app if needed and return its id.
    pub async fn create_or_update_app(&self, org: &str, slug: &str, name: &str) -> Result<Uuid> {
        let path = format!("/api/v1/orgs/{}/apps/{}", org, slug);
        let created: Created = self
            .send(self.client.put(self.url(&path)).json(&AppRequest { name }))
            .await?;
        Ok(created.id)
    }

    /// Store a new compose file version for an environment and return its id.
    pub async fn create_environment_compose_file(
        &self,
        org: &str,
        app: &str,
        environment: &str,
        body: &ComposeFileRequest,
    ) -> Result<Uuid> {
        let path = format!(
            "/api/v1/orgs/{}/apps/{}/environments/{}/compose-files",
            org, app, environment
        );
        let created: Created = self
            .send(self.client.post(self.url(&path)).json(body))
            .await?;
        Ok(created.id)
    }

    /// Roll a stored compose file out to the environment's targets.
    ///
    /// Returns one deployment id per target; empty when the environment has none.
    pub async fn deploy_compose_file(&self, compose_file: Uuid) -> Result<Vec<Uuid>> {
        let path = format!("/api/v1/compose-files/{}/deploy", compose_file);
        let deployed: Deployed = self.send(self.client.post(self.url(&path))).await?;
        Ok(deployed.deployments.into_iter().map(|d| d.id).collect())
    }
}
