//! `CommandRunner` implementation backed by `tokio::process`.

use std::time::{Duration, Instant};

use agent_shim_core::{
    CommandRunner, ExecMode, FailureReason, InvocationResult, ResolvedCommand, ShimError,
    ShimSettings,
};
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::command::{build_command, is_shell_launch_failure, program_name};
use crate::shutdown::kill_process_tree;

/// How long to wait for pipe readers once a timed-out process was killed.
const DRAIN_AFTER_KILL: Duration = Duration::from_secs(1);

/// Runs resolved commands as child processes.
///
/// Each call spawns one process and waits for it asynchronously, so a slow
/// backend only holds up its own request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCommandRunner {
    exec_mode: ExecMode,
    timeout: Option<Duration>,
}

impl ProcessCommandRunner {
    /// Create a runner with the given exec mode and no deadline.
    #[must_use]
    pub const fn new(exec_mode: ExecMode) -> Self {
        Self {
            exec_mode,
            timeout: None,
        }
    }

    /// Build a runner from startup settings.
    #[must_use]
    pub const fn from_settings(settings: &ShimSettings) -> Self {
        Self {
            exec_mode: settings.exec_mode,
            timeout: settings.timeout,
        }
    }

    /// Kill the backend once it runs longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run(&self, command: &ResolvedCommand) -> Result<InvocationResult, ShimError> {
        let command_line = command.command_line();
        let mut cmd = build_command(command_line, self.exec_mode)?;

        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|e| ShimError::Invocation {
            message: format!(
                "`{}`: {e}",
                program_name(command_line, self.exec_mode)
            ),
            stderr: String::new(),
        })?;
        debug!(pid = ?child.id(), mode = %self.exec_mode, "Spawned backend command");

        // The group id outlives the direct child, so a lingering grandchild can still be killed.
        let pgid = child.id();
        let mut stdout_task = spawn_reader(child.stdout.take());
        let mut stderr_task = spawn_reader(child.stderr.take());

        // The deadline covers draining the pipes too: a background grandchild
        // can keep them open after the direct child has exited.
        let finished = async {
            let status = child.wait().await;
            let stdout = (&mut stdout_task).await.unwrap_or_default();
            let stderr = (&mut stderr_task).await.unwrap_or_default();
            (status, stdout, stderr)
        };
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, finished).await.ok(),
            None => Some(finished.await),
        };

        let Some((status, stdout, stderr)) = outcome else {
            let limit = self.timeout.unwrap_or_default();
            warn!(pid = ?pgid, ?limit, "Backend command exceeded its deadline, killing it");
            kill_process_tree(&mut child, pgid).await;
            stdout_task.abort();
            let stderr = tokio::time::timeout(DRAIN_AFTER_KILL, stderr_task)
                .await
                .ok()
                .and_then(Result::ok)
                .unwrap_or_default();
            return Err(ShimError::CommandFailed {
                reason: FailureReason::TimedOut(limit),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            });
        };

        let status = status.map_err(|e| ShimError::Invocation {
            message: format!("failed to wait for backend command: {e}"),
            stderr: String::new(),
        })?;

        let result =
            InvocationResult::from_bytes(status.code(), &stdout, &stderr, started.elapsed());

        debug!(
            exit_code = ?result.exit_code,
            elapsed = ?result.elapsed,
            "Backend command exited"
        );

        match result.exit_code {
            Some(code) if is_shell_launch_failure(self.exec_mode, code) => {
                Err(ShimError::Invocation {
                    message: format!("shell could not run the command (exit code {code})"),
                    stderr: result.stderr,
                })
            }
            _ => Ok(result),
        }
    }
}

/// Read a pipe to the end on its own task so a full pipe never stalls the child.
fn spawn_reader<R>(pipe: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf).await {
                debug!("Failed to read backend output: {e}");
            }
        }
        buf
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    async fn run(line: &str) -> Result<InvocationResult, ShimError> {
        ProcessCommandRunner::default()
            .run(&ResolvedCommand::new(line))
            .await
    }

    #[tokio::test]
    async fn test_captures_stdout_and_exit_code() {
        let result = run("echo hello").await.unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_returned_with_stderr() {
        let result = run("echo boom >&2; exit 1").await.unwrap();
        assert_eq!(result.exit_code, Some(1));
        assert_eq!(result.stderr.trim(), "boom");
    }

    #[tokio::test]
    async fn test_stderr_does_not_mean_failure() {
        let result = run("echo warn >&2; echo ok").await.unwrap();
        assert!(result.success());
        assert_eq!(result.stdout.trim(), "ok");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let result = run(r"printf 'a\377b'").await.unwrap();
        assert_eq!(result.stdout, "a\u{FFFD}b");
    }

    #[tokio::test]
    async fn test_missing_program_in_shell_mode_is_invocation_error() {
        let err = run("definitely-not-a-real-binary-xyz --flag").await.unwrap_err();
        match err {
            ShimError::Invocation { stderr, .. } => {
                assert!(stderr.contains("definitely-not-a-real-binary-xyz"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_in_direct_mode_is_invocation_error() {
        let runner = ProcessCommandRunner::new(ExecMode::Direct);
        let err = runner
            .run(&ResolvedCommand::new("definitely-not-a-real-binary-xyz"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShimError::Invocation { .. }));
        assert!(err.to_string().contains("definitely-not-a-real-binary-xyz"));
    }

    #[tokio::test]
    async fn test_direct_mode_passes_arguments_verbatim() {
        let runner = ProcessCommandRunner::new(ExecMode::Direct);
        let result = runner
            .run(&ResolvedCommand::new("printf '%s|' 'a b' '$HOME'"))
            .await
            .unwrap();
        assert_eq!(result.stdout, "a b|$HOME|");
    }

    #[tokio::test]
    async fn test_non_executable_file_is_invocation_error() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("not-executable.sh");
        fs::write(&script, "#!/bin/sh\necho hi\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();

        let err = run(&script.display().to_string()).await.unwrap_err();
        assert!(matches!(err, ShimError::Invocation { .. }));
    }

    #[tokio::test]
    async fn test_timeout_kills_command() {
        let runner = ProcessCommandRunner::default().with_timeout(Some(Duration::from_millis(200)));
        let started = Instant::now();
        let err = runner
            .run(&ResolvedCommand::new("echo partial >&2; sleep 30"))
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(10));
        match err {
            ShimError::CommandFailed { reason, stderr } => {
                assert_eq!(reason, FailureReason::TimedOut(Duration::from_millis(200)));
                assert!(stderr.contains("partial"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_covers_grandchild_holding_stdout() {
        let runner = ProcessCommandRunner::default().with_timeout(Some(Duration::from_millis(500)));
        let started = Instant::now();
        let err = runner
            .run(&ResolvedCommand::new("(sleep 4 &) ; echo hi"))
            .await
            .unwrap_err();

        assert!(
            started.elapsed() < Duration::from_secs(3),
            "deadline not honored: took {:?}",
            started.elapsed()
        );
        assert!(matches!(
            err,
            ShimError::CommandFailed {
                reason: FailureReason::TimedOut(_),
                ..
            }
        ));
    }

    /// True once `pid` no longer exists or is only a zombie awaiting reaping.
    #[cfg(target_os = "linux")]
    fn process_is_dead(pid: i32) -> bool {
        use nix::errno::Errno;
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        if kill(Pid::from_raw(pid), None) == Err(Errno::ESRCH) {
            return true;
        }
        fs::read_to_string(format!("/proc/{pid}/stat")).map_or(true, |stat| {
            stat.rsplit_once(')')
                .is_some_and(|(_, rest)| rest.trim_start().starts_with('Z'))
        })
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_abandoned_run_kills_command() {
        let dir = TempDir::new().unwrap();
        let pid_file = dir.path().join("pid");
        let command = ResolvedCommand::new(format!(
            "echo $$ > {}; exec sleep 30",
            pid_file.display()
        ));

        // Dropping the run future stands in for a disconnected client.
        let runner = ProcessCommandRunner::default();
        let outcome = tokio::time::timeout(Duration::from_millis(500), runner.run(&command)).await;
        assert!(outcome.is_err());

        let pid: i32 = fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !process_is_dead(pid) {
            assert!(Instant::now() < deadline, "backend {pid} still running");
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    #[tokio::test]
    async fn test_fast_command_finishes_within_timeout() {
        let runner = ProcessCommandRunner::default().with_timeout(Some(Duration::from_secs(10)));
        let result = runner.run(&ResolvedCommand::new("echo quick")).await.unwrap();
        assert_eq!(result.stdout.trim(), "quick");
    }

    #[tokio::test]
    async fn test_large_output_is_fully_captured() {
        let result = run("yes line | head -n 20000").await.unwrap();
        assert_eq!(result.stdout.lines().count(), 20000);
    }
}
