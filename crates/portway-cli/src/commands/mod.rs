//! Subcommand implementations

pub mod deploy;
pub mod validate;

use anyhow::{Context, Result};
use portway_compose::ApplicationGraph;
use portway_lint::{CheckRegistry, Engine, Scope, SkipSet, ValidationResult};
use tracing::warn;

/// Run the built-in checks, warning about skip codes that match nothing.
pub(crate) fn run_checks(
    graph: &ApplicationGraph,
    skip: &SkipSet,
    scope: &Scope,
) -> Result<ValidationResult> {
    let registry = CheckRegistry::builtin();
    for code in skip.unknown_codes(&registry) {
        warn!("Ignoring unknown check code {} in --skip-checks", code);
    }
    Engine::new(&registry)
        .run_scoped(graph, skip, scope)
        .context("Validation could not run")
}

/// Print a rendered document with exactly one trailing newline.
pub(crate) fn emit(rendered: &str) {
    println!("{}", rendered.trim_end());
}
