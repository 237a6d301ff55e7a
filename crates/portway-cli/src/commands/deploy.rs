//! `portway deploy`

use super::{emit, run_checks};
use crate::api::{ApiClient, ComposeFileRequest};
use crate::ci::is_ci;
use crate::config::ProjectConfig;
use crate::resolve::ComposeResolver;
use crate::version;
use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use portway_compose::{ApplicationGraph, ComposeLoader};
use portway_lint::{Outcome, Report, Scope, SkipSet};
use std::fmt;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// Target environment, as named in the project configuration
    #[arg(short, long)]
    pub env: String,

    /// Project configuration file (default: .portway.yaml or .portway.yml in the working directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Version label (default: git short hash, else a hash of the compose files)
    #[arg(long)]
    pub version: Option<String>,

    /// Deploy even when validation reports errors
    #[arg(long)]
    pub force: bool,

    /// Comma-separated check codes to skip, e.g. PW001,PW003
    #[arg(long, value_name = "CODES")]
    pub skip_checks: Option<String>,

    /// Validate and print the plan without contacting the control plane
    #[arg(long)]
    pub dry_run: bool,
}

/// Where and as whom to submit.
#[derive(Debug, Clone)]
pub struct Remote {
    pub url: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySummary {
    pub app: String,
    pub environment: String,
    pub version: String,
    pub outcome: Outcome,
    /// Id of the stored compose file, `None` for dry runs.
    pub compose_file_id: Option<Uuid>,
    /// One id per deployment target that received the compose file.
    pub deployment_ids: Vec<Uuid>,
}

pub async fn run(args: &DeployArgs, remote: &Remote) -> Result<DeploySummary> {
    let config = match &args.config {
        Some(path) => ProjectConfig::load(path)?,
        None => {
            let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
            ProjectConfig::discover(&cwd)?
        }
    };
    let config_dir = config.config_dir().to_path_buf();
    let app = config.app.slug.clone();
    if app.is_empty() {
        bail!("{} does not set app.slug", config.path().display());
    }

    if version::has_uncommitted_changes(&config_dir) {
        warn!("There are uncommitted changes in {}", config_dir.display());
    }

    let references = config.environment(&args.env)?.references()?;
    if references.is_empty() {
        bail!("No compose files configured for environment '{}'", args.env);
    }

    let sources = ComposeResolver::new(&config_dir)?
        .resolve_all(&references)
        .await?;
    let raw = sources
        .iter()
        .map(|source| source.content.as_str())
        .collect::<Vec<_>>()
        .join("\n---\n");
    let graph = ComposeLoader::new()
        .with_os_env()
        .with_project_name(&app)
        .load_sources(sources)
        .context("Failed to load compose configuration")?;

    let skip = SkipSet::parse(args.skip_checks.as_deref().unwrap_or_default());
    let result = run_checks(&graph, &skip, &Scope::Global)?;
    if !result.is_clean() {
        emit(&Report::from_result(&result).render_text());
    }

    let outcome = result.outcome(args.force);
    match outcome {
        Outcome::Failed => bail!(
            "Validation failed with {} error(s); fix them or re-run with --force",
            result.errors.len()
        ),
        Outcome::Forced => warn!(
            "Deploying despite {} validation error(s) because --force was given",
            result.errors.len()
        ),
        Outcome::Clean | Outcome::Passed => {}
    }

    emit(&services_table(&graph));

    let with_build: Vec<&str> = graph
        .services_with_build()
        .map(|service| service.name.as_str())
        .collect();
    if !with_build.is_empty() {
        warn!(
            "Images are not built by portway; submitting build services as written: {}",
            with_build.join(", ")
        );
    }

    let version = version::determine_version(args.version.as_deref(), &config_dir, raw.as_bytes());
    let mut summary = DeploySummary {
        app,
        environment: args.env.clone(),
        version,
        outcome,
        compose_file_id: None,
        deployment_ids: Vec::new(),
    };

    if args.dry_run {
        println!(
            "Dry run: version {} for {} was not submitted",
            summary.version, summary.environment
        );
        return Ok(summary);
    }

    let token = remote
        .token
        .as_deref()
        .filter(|token| !token.trim().is_empty())
        .context("No API key configured; set PORTWAY_API_KEY or pass --token")?;
    let client = ApiClient::new(&remote.url, token)?;

    let progress = Progress::start(format!("Submitting version {}", summary.version));
    let submitted = submit(&client, &summary, &graph).await;
    let id = match submitted {
        Ok(id) => {
            progress.finish(format!("Submitted version {}", summary.version));
            id
        }
        Err(err) => {
            progress.finish("Submission failed".to_string());
            return Err(err);
        }
    };

    println!(
        "Created version {} of the {} compose file ({})",
        summary.version, summary.environment, id
    );
    summary.compose_file_id = Some(id);

    let deployments = client
        .deploy_compose_file(id)
        .await
        .with_context(|| {
            format!(
                "Failed to deploy version {} to {}",
                summary.version, summary.environment
            )
        })?;
    if deployments.is_empty() {
        warn!(
            "No deployment targets found for {}; add a target or branch to the environment",
            summary.environment
        );
    } else {
        for deployment in &deployments {
            println!("Started deployment {}", deployment);
        }
    }
    summary.deployment_ids = deployments;
    Ok(summary)
}

async fn submit(client: &ApiClient, summary: &DeploySummary, graph: &ApplicationGraph) -> Result<Uuid> {
    let org = client
        .whoami()
        .await
        .context("Failed to determine the organization for this API key")?;

    let app_id = client
        .create_or_update_app(&org, &summary.app, &summary.app)
        .await
        .with_context(|| format!("Failed to register app {}", summary.app))?;
    info!("App {}/{} has id {}", org, summary.app, app_id);

    let request = ComposeFileRequest {
        compose_normalized: serde_json::to_value(graph)
            .context("Failed to encode the application graph as JSON")?,
        compose_raw: serde_yaml::to_string(graph)
            .context("Failed to encode the application graph as YAML")?,
        version: summary.version.clone(),
    };

    let id = client
        .create_environment_compose_file(&org, &summary.app, &summary.environment, &request)
        .await
        .with_context(|| format!("Failed to create the {} compose file", summary.environment))?;
    Ok(id)
}

/// `SERVICE  IMAGE  BUILD` table, one row per service in key order.
pub fn services_table(graph: &ApplicationGraph) -> String {
    ServicesTable(graph).to_string()
}

struct ServicesTable<'a>(&'a ApplicationGraph);

impl fmt::Display for ServicesTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.0;
        let rows: Vec<[&str; 3]> = graph
            .services
            .iter()
            .map(|(name, service)| {
                [
                    name.as_str(),
                    service.image.as_deref().unwrap_or("-"),
                    if service.build.is_some() { "yes" } else { "no" },
                ]
            })
            .collect();

        let header = ["SERVICE", "IMAGE", "BUILD"];
        let mut widths = [0usize; 2];
        for row in std::iter::once(&header).chain(rows.iter()) {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        writeln!(f, "Found {} service(s)\n", graph.services.len())?;
        for row in std::iter::once(&header).chain(rows.iter()) {
            writeln!(
                f,
                "{:<w0$}  {:<w1$}  {}",
                row[0],
                row[1],
                row[2],
                w0 = widths[0],
                w1 = widths[1]
            )?;
        }
        Ok(())
    }
}

/// Spinner on interactive terminals, nothing in CI or when piped.
struct Progress(Option<ProgressBar>);

impl Progress {
    fn start(message: String) -> Self {
        if is_ci() || !std::io::stderr().is_terminal() {
            info!("{}", message);
            return Self(None);
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(message);
        Self(Some(pb))
    }

    fn finish(self, message: String) {
        match self.0 {
            Some(pb) => pb.finish_with_message(message),
            None => info!("{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portway_compose::Service;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_services_table() {
        let graph = ApplicationGraph::new("shop")
            .with_service(Service::new("web").image("nginx:1.25"))
            .with_service(Service::new("api").build("./api"));

        assert_eq!(
            services_table(&graph),
            "\
Found 2 service(s)

SERVICE  IMAGE       BUILD
api      -           yes
web      nginx:1.25  no
"
        );
    }
}
