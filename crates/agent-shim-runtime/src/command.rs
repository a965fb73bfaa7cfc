//! Command builder for backend invocations.
//!
//! Turns a resolved command line into a `tokio::process::Command`, either
//! through the platform shell or as a split argument vector.

use std::process::Stdio;

use agent_shim_core::{ExecMode, ShimError};
use tokio::process::Command;

/// Exit codes the shell uses to report that the program itself could not be run.
#[cfg(unix)]
const SHELL_LAUNCH_FAILURE_CODES: &[i32] = &[126, 127];
#[cfg(windows)]
const SHELL_LAUNCH_FAILURE_CODES: &[i32] = &[9009];
#[cfg(not(any(unix, windows)))]
const SHELL_LAUNCH_FAILURE_CODES: &[i32] = &[];

/// Whether an exit code from a shell-run command means "could not launch".
///
/// POSIX shells exit with 127 when the program is not found and 126 when it
/// is not executable.
#[must_use]
pub fn is_shell_launch_failure(mode: ExecMode, code: i32) -> bool {
    mode == ExecMode::Shell && SHELL_LAUNCH_FAILURE_CODES.contains(&code)
}

/// Name of the program that will be started, for error messages.
#[must_use]
pub fn program_name(command_line: &str, mode: ExecMode) -> String {
    match mode {
        ExecMode::Shell => shell_program().to_string(),
        ExecMode::Direct => shlex::split(command_line)
            .and_then(|parts| parts.into_iter().next())
            .unwrap_or_default(),
    }
}

#[cfg(windows)]
const fn shell_program() -> &'static str {
    "cmd"
}

#[cfg(not(windows))]
const fn shell_program() -> &'static str {
    "/bin/sh"
}

/// Build the command with piped output and a closed stdin.
///
/// The child is killed when the returned command's `Child` is dropped, so an
/// abandoned request does not leave the backend running.
pub fn build_command(command_line: &str, mode: ExecMode) -> Result<Command, ShimError> {
    let mut cmd = match mode {
        ExecMode::Shell => shell_command(command_line),
        ExecMode::Direct => direct_command(command_line)?,
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group so a deadline can take down everything the command started.
    #[cfg(unix)]
    cmd.process_group(0);

    Ok(cmd)
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new(shell_program());
    cmd.arg("/C").arg(command_line);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new(shell_program());
    cmd.arg("-c").arg(command_line);
    cmd
}

fn direct_command(command_line: &str) -> Result<Command, ShimError> {
    let parts = shlex::split(command_line).ok_or_else(|| ShimError::Invocation {
        message: "command line has unbalanced quotes and cannot be split".to_string(),
        stderr: String::new(),
    })?;

    let (program, args) = parts.split_first().ok_or_else(|| ShimError::Invocation {
        message: "command line is empty".to_string(),
        stderr: String::new(),
    })?;

    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_mode_rejects_unbalanced_quotes() {
        let err = build_command("tool 'unterminated", ExecMode::Direct).unwrap_err();
        assert!(matches!(err, ShimError::Invocation { .. }));
    }

    #[test]
    fn test_direct_mode_rejects_empty_command() {
        let err = build_command("   ", ExecMode::Direct).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_program_name() {
        assert_eq!(
            program_name("'my tool' --flag", ExecMode::Direct),
            "my tool"
        );
        assert_eq!(program_name("anything", ExecMode::Shell), shell_program());
    }

    #[test]
    #[cfg(unix)]
    fn test_shell_launch_failure_codes() {
        assert!(is_shell_launch_failure(ExecMode::Shell, 127));
        assert!(is_shell_launch_failure(ExecMode::Shell, 126));
        assert!(!is_shell_launch_failure(ExecMode::Shell, 1));
        assert!(!is_shell_launch_failure(ExecMode::Direct, 127));
    }
}
