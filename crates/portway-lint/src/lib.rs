//! Portway validation engine
//!
//! Checks deployment compatibility of a compose application graph before it
//! is submitted to the control plane.
//!
//! The pieces, leaves first:
//! 1. [`Check`]: a coded, severity-tagged rule over a [`ValidationContext`]
//! 2. [`CheckRegistry`]: the catalog of checks, keyed by code
//! 3. [`Engine`]: runs the non-skipped checks in code order
//! 4. [`ValidationResult`]: issues partitioned by severity
//! 5. [`Report`] and [`Catalog`]: deterministic presentation
//!
//! # Example
//!
//! ```
//! use portway_compose::{ApplicationGraph, Service};
//! use portway_lint::{CheckRegistry, Engine, SkipSet};
//!
//! let graph = ApplicationGraph::new("demo")
//!     .with_service(Service::new("web").image("nginx").restart("always"));
//!
//! let registry = CheckRegistry::builtin();
//! let result = Engine::new(&registry).run(&graph, &SkipSet::default()).unwrap();
//!
//! assert!(!result.has_errors());
//! assert_eq!(result.warnings.len(), 2);
//! ```

pub mod checks;
pub mod reporter;

mod check;
mod engine;
mod error;
mod issue;
mod registry;

pub use check::{Check, CheckInfo, Finding, Scope, Severity, ValidationContext};
pub use engine::{Engine, SkipSet};
pub use error::{LintError, Result};
pub use issue::{Outcome, ValidationIssue, ValidationResult};
pub use registry::CheckRegistry;
pub use reporter::{Catalog, OutputFormat, Report};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::check::{Check, CheckInfo, Finding, Scope, Severity, ValidationContext};
    pub use crate::engine::{Engine, SkipSet};
    pub use crate::issue::{Outcome, ValidationIssue, ValidationResult};
    pub use crate::registry::CheckRegistry;
    pub use crate::reporter::{Catalog, OutputFormat, Report};
    pub use crate::{LintError, Result};
}
