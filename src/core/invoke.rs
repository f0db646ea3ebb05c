//! Process invocation with explicit exit-code policy.
//!
//! An `Invocation` is immutable once assembled: either a full shell command
//! line (build/test commands routinely use shell features) or a direct
//! argument vector (docker/terraform are assembled token by token and never
//! need a shell).

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Shell {
        command: String,
        working_dir: Option<String>,
    },
    Argv {
        program: String,
        args: Vec<String>,
        working_dir: Option<String>,
    },
}

impl Invocation {
    pub fn shell(command: impl Into<String>, working_dir: Option<String>) -> Self {
        Self::Shell {
            command: command.into(),
            working_dir,
        }
    }

    pub fn argv(
        program: impl Into<String>,
        args: Vec<String>,
        working_dir: Option<String>,
    ) -> Self {
        Self::Argv {
            program: program.into(),
            args,
            working_dir,
        }
    }

    /// The command as a single display string (for logs and error details).
    pub fn display(&self) -> String {
        match self {
            Self::Shell { command, .. } => command.clone(),
            Self::Argv { program, args, .. } => {
                let mut parts = vec![program.clone()];
                parts.extend(args.iter().cloned());
                parts.join(" ")
            }
        }
    }
}

/// How a non-zero exit code is interpreted.
///
/// Build, container, and provisioning operations fail loudly. Test execution
/// tolerates red suites: the parsed metrics decide the outcome, not the
/// process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    FailOnNonZero,
    ToleratesNonZero,
}

/// Exit code plus combined stdout+stderr text. Interleaving order is
/// tool-dependent and not guaranteed.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub exit_code: i32,
    pub output: String,
}

/// Run an invocation to completion, capturing combined output.
///
/// Inability to spawn the process is always fatal regardless of policy;
/// tolerance applies only to the exit code of a process that actually ran.
pub fn run(invocation: &Invocation, policy: ExitPolicy) -> Result<ProcessOutcome> {
    let mut cmd = build_command(invocation);

    crate::log_status!("invoke", "Running: {}", invocation.display());

    let out = cmd.output().map_err(|e| {
        Error::internal_io(
            format!("Failed to spawn process: {}", e),
            Some(invocation.display()),
        )
    })?;

    let outcome = ProcessOutcome {
        exit_code: out.status.code().unwrap_or(-1),
        output: format!(
            "{}{}",
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        ),
    };

    match policy {
        ExitPolicy::FailOnNonZero if outcome.exit_code != 0 => Err(Error::process_failed(
            invocation.display(),
            outcome.exit_code,
            outcome.output,
        )),
        _ => Ok(outcome),
    }
}

/// Run an argv invocation feeding text to stdin (registry login).
/// Exit-code interpretation is left to the caller.
pub fn run_with_stdin(invocation: &Invocation, input: &str) -> Result<ProcessOutcome> {
    let mut cmd = build_command(invocation);
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| {
        Error::internal_io(
            format!("Failed to spawn process: {}", e),
            Some(invocation.display()),
        )
    })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).map_err(|e| {
            Error::internal_io(format!("Failed to write stdin: {}", e), None)
        })?;
    }

    let out = child.wait_with_output().map_err(|e| {
        Error::internal_io(format!("Failed to await process: {}", e), None)
    })?;

    Ok(ProcessOutcome {
        exit_code: out.status.code().unwrap_or(-1),
        output: format!(
            "{}{}",
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        ),
    })
}

fn build_command(invocation: &Invocation) -> Command {
    match invocation {
        Invocation::Shell {
            command,
            working_dir,
        } => {
            #[cfg(windows)]
            let mut cmd = {
                let mut cmd = Command::new("cmd");
                cmd.args(["/C", command]);
                cmd
            };

            #[cfg(not(windows))]
            let mut cmd = {
                let mut cmd = Command::new("sh");
                cmd.args(["-c", command]);
                cmd
            };

            if let Some(dir) = working_dir {
                cmd.current_dir(dir);
            }
            cmd
        }
        Invocation::Argv {
            program,
            args,
            working_dir,
        } => {
            let mut cmd = Command::new(program);
            cmd.args(args);
            if let Some(dir) = working_dir {
                cmd.current_dir(dir);
            }
            cmd
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn shell_invocation_captures_combined_output() {
        let inv = Invocation::shell("echo out; echo err 1>&2", None);
        let outcome = run(&inv, ExitPolicy::FailOnNonZero).unwrap();
        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.output.contains("out"));
        assert!(outcome.output.contains("err"));
    }

    #[test]
    fn fail_on_non_zero_raises_process_failed() {
        let inv = Invocation::shell("echo boom; exit 3", None);
        let err = run(&inv, ExitPolicy::FailOnNonZero).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProcessFailed);
        assert!(err.description().contains("boom"));
    }

    #[test]
    fn tolerant_policy_returns_outcome_for_non_zero() {
        let inv = Invocation::shell("echo 1 failed; exit 1", None);
        let outcome = run(&inv, ExitPolicy::ToleratesNonZero).unwrap();
        assert_eq!(outcome.exit_code, 1);
        assert!(outcome.output.contains("1 failed"));
    }

    #[test]
    fn argv_invocation_runs_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::argv(
            "pwd",
            vec![],
            Some(dir.path().to_string_lossy().to_string()),
        );
        let outcome = run(&inv, ExitPolicy::FailOnNonZero).unwrap();
        assert!(outcome.output.trim().ends_with(
            dir.path()
                .file_name()
                .unwrap()
                .to_str()
                .unwrap()
        ));
    }

    #[test]
    fn spawn_failure_is_fatal_even_when_tolerant() {
        let inv = Invocation::argv("nonexistent_command_xyz", vec![], None);
        let err = run(&inv, ExitPolicy::ToleratesNonZero).unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalIoError);
    }

    #[test]
    fn display_joins_argv_tokens() {
        let inv = Invocation::argv("docker", vec!["build".into(), "-t".into(), "x".into()], None);
        assert_eq!(inv.display(), "docker build -t x");
    }
}
