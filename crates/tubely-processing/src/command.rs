//! Bounded execution of external media tools.

use std::ffi::OsStr;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

// Keep error messages readable when a tool dumps a lot of diagnostics.
const MAX_STDERR_CHARS: usize = 2048;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Run `program` to completion, killing it if it outlives `timeout`.
///
/// Stdin is closed and both output streams are captured. A non-zero exit is an error.
pub async fn run_with_deadline<I, S>(
    program: &str,
    args: I,
    timeout: Duration,
) -> Result<CommandOutput, CommandError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let start = std::time::Instant::now();

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?;

    // On expiry the wait future is dropped together with the child, which kills it.
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?,
        Err(_) => {
            tracing::warn!(
                program = %program,
                timeout_secs = timeout.as_secs(),
                "External command timed out and was killed"
            );
            return Err(CommandError::TimedOut {
                program: program.to_string(),
                timeout,
            });
        }
    };

    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr: String = stderr.trim().chars().take(MAX_STDERR_CHARS).collect();
        tracing::warn!(
            program = %program,
            status = %output.status,
            stderr = %stderr,
            duration_ms,
            "External command failed"
        );
        return Err(CommandError::Failed {
            program: program.to_string(),
            status: output.status,
            stderr,
        });
    }

    tracing::debug!(program = %program, duration_ms, "External command completed");

    Ok(CommandOutput {
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout() {
        let output = run_with_deadline("sh", ["-c", "printf hello"], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.stdout, b"hello");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_failure_with_stderr() {
        let err = run_with_deadline(
            "sh",
            ["-c", "echo broken pipe >&2; exit 3"],
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        match err {
            CommandError::Failed { status, stderr, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "broken pipe");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let err = run_with_deadline(
            "/nonexistent/tubely-tool",
            Vec::<&str>::new(),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_deadline_kills_hung_process() {
        let start = std::time::Instant::now();
        let err = run_with_deadline("sh", ["-c", "sleep 30"], Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::TimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
