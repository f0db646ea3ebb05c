//! Source-control context queries for derived image tags.
//!
//! Unavailability is non-fatal by construction: not being inside a
//! repository, or git missing entirely, simply yields None and the derived
//! tag is skipped.

use crate::utils::command;

/// Current commit SHA in the given directory, if inside a git repository.
pub fn commit_sha(dir: &str) -> Option<String> {
    command::run_in_optional(dir, "git", &["rev-parse", "HEAD"])
}

/// Current branch name in the given directory, if inside a git repository.
pub fn branch_name(dir: &str) -> Option<String> {
    command::run_in_optional(dir, "git", &["rev-parse", "--abbrev-ref", "HEAD"])
}
