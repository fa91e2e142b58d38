//! Running external programs with a bounded timeout

use super::ExecutionError;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Lines of stderr kept for error reports
const STDERR_TAIL_LINES: usize = 20;

/// Process group of the command currently running, 0 when idle
static RUNNING_GROUP: AtomicI32 = AtomicI32::new(0);

/// Kill the process group of the command that is running right now, if any.
///
/// Children run in their own process group so a terminal Ctrl+C does not
/// reach them; call this before exiting early so they do not outlive us.
pub fn terminate_running() {
    let group = RUNNING_GROUP.swap(0, Ordering::SeqCst);
    if group > 0 {
        kill_group(group);
    }
}

#[cfg(unix)]
fn kill_group(group: i32) {
    // SAFETY: killpg only sends a signal; the group id came from our own child
    let rc = unsafe { libc::killpg(group, libc::SIGKILL) };
    if rc != 0 {
        tracing::debug!(group, error = %std::io::Error::last_os_error(), "killpg failed");
    }
}

#[cfg(not(unix))]
fn kill_group(_group: i32) {}

/// What a finished command produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Last few lines of stderr, for error messages
    pub fn stderr_tail(&self) -> String {
        let lines: Vec<&str> = self.stderr.lines().collect();
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        lines[start..].join("\n")
    }
}

/// Runs one external command to completion.
///
/// A non-zero exit is not an error at this level; the executor decides
/// what it means. Errors are reserved for commands that could not be
/// started or did not finish in time.
pub trait CommandRunner {
    fn run(
        &self,
        argv: &[String],
        cwd: &Path,
        limit: Duration,
    ) -> impl Future<Output = Result<CommandOutput, ExecutionError>>;
}

/// Runs commands as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        argv: &[String],
        cwd: &Path,
        limit: Duration,
    ) -> Result<CommandOutput, ExecutionError> {
        let (program, args) = argv.split_first().ok_or(ExecutionError::EmptyCommand)?;

        let cwd = absolute(cwd).map_err(|source| ExecutionError::Io {
            path: cwd.to_path_buf(),
            source,
        })?;
        // relative programs (a virtualenv's pip) resolve against the command's cwd
        let resolved = which::which_in(program, std::env::var_os("PATH"), &cwd).map_err(|_| {
            ExecutionError::ToolNotFound {
                program: program.clone(),
            }
        })?;

        tracing::debug!(program = %resolved.display(), cwd = %cwd.display(), "spawning");

        let mut command = TokioCommand::new(&resolved);
        command
            .args(args)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // own process group: Ctrl+C only sets the cancel flag, and a timeout
        // can take down everything the command started
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|source| ExecutionError::Spawn {
            argv: argv.to_vec(),
            source,
        })?;
        let group = child
            .id()
            .and_then(|pid| i32::try_from(pid).ok())
            .unwrap_or(0);
        RUNNING_GROUP.store(group, Ordering::SeqCst);

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let finished = timeout(limit, async {
            let (stdout, stderr) = tokio::join!(collect(stdout, "stdout"), collect(stderr, "stderr"));
            let status = child.wait().await;
            (stdout, stderr, status)
        })
        .await;
        RUNNING_GROUP.store(0, Ordering::SeqCst);

        match finished {
            Ok((stdout, stderr, status)) => {
                let status = status.map_err(|source| ExecutionError::Spawn {
                    argv: argv.to_vec(),
                    source,
                })?;
                Ok(CommandOutput {
                    code: status.code(),
                    stdout,
                    stderr,
                })
            }
            Err(_) => {
                if group > 0 {
                    kill_group(group);
                }
                let _ = child.kill().await;
                Err(ExecutionError::TimedOut {
                    argv: argv.to_vec(),
                    limit,
                })
            }
        }
    }
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Read a child stream to the end, echoing lines to the debug log
async fn collect<R: AsyncRead + Unpin>(stream: Option<R>, name: &'static str) -> String {
    let Some(stream) = stream else {
        return String::new();
    };

    let mut lines = BufReader::new(stream).lines();
    let mut out = String::new();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                tracing::debug!(stream = name, "{}", line);
                out.push_str(&line);
                out.push('\n');
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(stream = name, "error reading child output: {}", e);
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let stderr: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let output = CommandOutput {
            code: Some(1),
            stdout: String::new(),
            stderr,
        };
        let tail = output.stderr_tail();
        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
        assert!(tail.ends_with("line 29"));
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = SystemRunner
            .run(
                &argv(&["stackgen-definitely-not-installed"]),
                dir.path(),
                Duration::from_secs(5),
            )
            .await;
        assert!(matches!(result, Err(ExecutionError::ToolNotFound { .. })));
    }

    #[tokio::test]
    async fn test_empty_command_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = SystemRunner.run(&[], dir.path(), Duration::from_secs(5)).await;
        assert!(matches!(result, Err(ExecutionError::EmptyCommand)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_and_output_captured() {
        let dir = tempfile::tempdir().unwrap();
        let output = SystemRunner
            .run(
                &argv(&["sh", "-c", "echo out; echo err >&2; exit 3"]),
                dir.path(),
                Duration::from_secs(10),
            )
            .await
            .unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr_tail(), "err");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_child() {
        let dir = tempfile::tempdir().unwrap();
        let result = SystemRunner
            .run(&argv(&["sleep", "5"]), dir.path(), Duration::from_millis(200))
            .await;
        match result {
            Err(err @ ExecutionError::TimedOut { .. }) => {
                assert_eq!(err.to_string(), "'sleep 5' timed out after 200ms");
            }
            other => panic!("expected a timeout, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_child_runs_in_its_own_process_group() {
        let dir = tempfile::tempdir().unwrap();
        let output = SystemRunner
            .run(
                &argv(&["sh", "-c", "ps -o pgid= -p $$"]),
                dir.path(),
                Duration::from_secs(10),
            )
            .await
            .unwrap();
        let child_group: i32 = output.stdout.trim().parse().unwrap();
        let own_group = unsafe { libc::getpgrp() };
        assert_ne!(child_group, own_group);
    }

    /// Alive and not a zombie waiting to be reaped
    #[cfg(target_os = "linux")]
    fn process_alive(pid: i32) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit_once(')')
                .and_then(|(_, rest)| rest.split_whitespace().next())
                .is_some_and(|state| state != "Z" && state != "X"),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_timeout_kills_grandchildren() {
        let dir = tempfile::tempdir().unwrap();
        let result = SystemRunner
            .run(
                &argv(&["sh", "-c", "sleep 30 & echo $! > grandchild.pid; wait"]),
                dir.path(),
                Duration::from_millis(500),
            )
            .await;
        assert!(matches!(result, Err(ExecutionError::TimedOut { .. })));

        let pid: i32 = std::fs::read_to_string(dir.path().join("grandchild.pid"))
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        let mut alive = true;
        for _ in 0..50 {
            alive = process_alive(pid);
            if !alive {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(!alive, "sleep {pid} outlived the timed-out command");
    }
}
