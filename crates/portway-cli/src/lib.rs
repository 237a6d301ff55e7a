//! Library interface for the portway CLI
//!
//! Everything the `portway` binary does is reachable from here so that it
//! can be exercised from integration tests without spawning processes.

pub mod api;
pub mod ci;
pub mod commands;
pub mod config;
pub mod resolve;
pub mod version;

/// Control plane used when neither `--url` nor `PORTWAY_URL` is set.
pub const DEFAULT_API_URL: &str = "https://portway.dev";
