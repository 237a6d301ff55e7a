//! `portway validate`

use super::{emit, run_checks};
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use portway_compose::ComposeLoader;
use portway_lint::{Catalog, CheckRegistry, OutputFormat, Report, Scope, SkipSet, ValidationResult};
use std::path::{Path, PathBuf};
use tracing::info;

/// Looked up in the working directory when no `-f` is given, in order.
pub const DEFAULT_COMPOSE_FILES: [&str; 4] = [
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

#[derive(Args, Debug, Clone)]
#[command(args_conflicts_with_subcommands = true)]
pub struct ValidateArgs {
    #[command(subcommand)]
    pub command: Option<ValidateCommand>,

    /// Compose file to validate; repeat to merge several in order
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Comma-separated check codes to skip, e.g. PW001,PW003
    #[arg(long, value_name = "CODES")]
    pub skip_checks: Option<String>,

    /// Only validate this service
    #[arg(long, value_name = "NAME")]
    pub service: Option<String>,

    /// Output format: text or json
    #[arg(long, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ValidateCommand {
    /// List every available check
    ListChecks {
        /// Output format: text or json
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Run the command and return the process exit code.
pub fn run(args: &ValidateArgs) -> Result<i32> {
    if let Some(ValidateCommand::ListChecks { format }) = &args.command {
        emit(&list_checks(*format)?);
        return Ok(0);
    }

    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    let files = compose_files(&args.files, &cwd)?;
    let skip = SkipSet::parse(args.skip_checks.as_deref().unwrap_or_default());

    let result = validate_files(&files, &skip, args.service.as_deref())?;
    let report = Report::from_result(&result);
    emit(&report.render(args.format)?);

    Ok(result.outcome(false).exit_code())
}

/// The check catalog rendered in `format`.
pub fn list_checks(format: OutputFormat) -> Result<String> {
    let catalog = Catalog::from_registry(&CheckRegistry::builtin());
    Ok(catalog.render(format)?)
}

/// Explicit files as given, else the first default compose file found in `dir`.
pub fn compose_files(explicit: &[PathBuf], dir: &Path) -> Result<Vec<PathBuf>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }
    match DEFAULT_COMPOSE_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
    {
        Some(path) => Ok(vec![path]),
        None => bail!(
            "No compose file found in {} (looked for {}); pass one with -f",
            dir.display(),
            DEFAULT_COMPOSE_FILES.join(", ")
        ),
    }
}

/// Load `files` and run every non-skipped check, optionally on one service.
pub fn validate_files(
    files: &[PathBuf],
    skip: &SkipSet,
    service: Option<&str>,
) -> Result<ValidationResult> {
    let graph = ComposeLoader::new()
        .with_os_env()
        .load_files(files)
        .context("Failed to load compose configuration")?;

    let scope = match service {
        Some(name) => Scope::Service(name.to_string()),
        None => Scope::Global,
    };
    info!(
        "Validating {} service(s) of project '{}'",
        graph.services.len(),
        graph.name
    );
    run_checks(&graph, skip, &scope)
}
