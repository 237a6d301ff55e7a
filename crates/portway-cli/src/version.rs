//! Deployment version labels

use sha2::{Digest, Sha256};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Pick the version label for a deployment.
///
/// An explicit label wins, then the short commit hash of `dir`'s git
/// checkout, then a content hash of the raw compose text.
pub fn determine_version(explicit: Option<&str>, dir: &Path, raw: &[u8]) -> String {
    if let Some(version) = explicit.map(str::trim).filter(|v| !v.is_empty()) {
        return version.to_string();
    }
    if let Some(revision) = git_short_revision(dir) {
        debug!("Using git revision {} as version", revision);
        return revision;
    }
    let hash = content_hash(raw);
    debug!("Not a git checkout, using content hash {} as version", hash);
    hash
}

/// First 8 hex characters of the SHA-256 of `raw`.
pub fn content_hash(raw: &[u8]) -> String {
    let mut digest = hex::encode(Sha256::digest(raw));
    digest.truncate(8);
    digest
}

pub fn git_short_revision(dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let revision = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!revision.is_empty()).then_some(revision)
}

/// Whether `git status` reports pending changes under `dir`. False outside a checkout.
pub fn has_uncommitted_changes(dir: &Path) -> bool {
    Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(dir)
        .output()
        .map(|output| output.status.success() && !output.stdout.is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_short_sha256() {
        assert_eq!(content_hash(b""), "e3b0c442");
        assert_eq!(content_hash(b"services: {}\n").len(), 8);
    }

    #[test]
    fn test_explicit_version_wins() {
        let dir = std::env::temp_dir();
        assert_eq!(determine_version(Some(" v1.2.0 "), &dir, b"x"), "v1.2.0");
    }
}
