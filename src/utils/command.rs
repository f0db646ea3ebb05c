//! Raw process primitives with consistent failure semantics.
//!
//! These are the low-level helpers used for side-channel queries (git
//! context, image metadata). The pipeline operations themselves go through
//! `core::invoke`, which captures combined output and applies exit policy.

use std::process::Command;

/// Run a command in a directory, returning None on any failure or empty stdout.
///
/// Useful when command failure is expected/acceptable (e.g., querying git
/// context outside a repository, or a tool that may not be installed).
pub fn run_in_optional(dir: &str, program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        None
    } else {
        Some(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_in_optional_returns_stdout() {
        let result = run_in_optional("/tmp", "echo", &["hello"]);
        assert_eq!(result.as_deref(), Some("hello"));
    }

    #[test]
    fn run_in_optional_returns_none_on_failure() {
        let result = run_in_optional("/tmp", "false", &[]);
        assert!(result.is_none());
    }

    #[test]
    fn run_in_optional_returns_none_for_missing_program() {
        let result = run_in_optional("/tmp", "nonexistent_command_xyz", &[]);
        assert!(result.is_none());
    }

}
