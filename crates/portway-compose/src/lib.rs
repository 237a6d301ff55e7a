//! Compose document loading and the application graph for portway
//!
//! A compose document (or several, merged in order) is read, interpolated
//! against the environment and normalized into an [`ApplicationGraph`]:
//! the read-only input every validation check and the deploy step work from.
//!
//! # Example
//!
//! ```
//! use portway_compose::ComposeLoader;
//!
//! let graph = ComposeLoader::new()
//!     .load_str("services:\n  web:\n    image: nginx:1.25\n")
//!     .unwrap();
//!
//! assert_eq!(graph.service_names().collect::<Vec<_>>(), vec!["web"]);
//! ```

pub mod dotenv;
pub mod graph;
pub mod interpolate;
pub mod loader;
pub mod merge;

mod error;
mod raw;

pub use error::{ComposeError, Result};
pub use graph::{ApplicationGraph, BuildConfig, MountType, PortMapping, Service, VolumeMount};
pub use loader::{ComposeLoader, ComposeSource};
