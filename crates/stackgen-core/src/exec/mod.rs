//! Applying a plan to disk and the process environment
//!
//! Operations run strictly one after another. The first failure stops the
//! run; whatever was applied before it stays on disk. Cancellation is
//! checked between operations, so a running command always gets to finish
//! or time out.

mod fs;
mod runner;

pub use runner::{terminate_running, CommandOutput, CommandRunner, SystemRunner};

use crate::config::DEFAULT_COMMAND_TIMEOUT;
use crate::plan::{Plan, PlannedOperation};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why an operation failed
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parent directory missing for {}", .0.display())]
    MissingParent(PathBuf),

    #[error("refusing to replace existing file {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("empty command")]
    EmptyCommand,

    #[error("'{program}' was not found on PATH")]
    ToolNotFound { program: String },

    #[error("failed to start '{}': {source}", .argv.join(" "))]
    Spawn {
        argv: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' exited with {}{}", .argv.join(" "), exit_label(.code), stderr_suffix(.stderr))]
    NonZeroExit {
        argv: Vec<String>,
        code: Option<i32>,
        stderr: String,
    },

    #[error("'{}' timed out after {:?}", .argv.join(" "), .limit)]
    TimedOut { argv: Vec<String>, limit: Duration },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!(":\n{}", stderr)
    }
}

/// Outcome of executing a plan
#[derive(Debug)]
pub enum ExecutionResult {
    /// Every operation was applied
    Completed { applied: Vec<PlannedOperation> },

    /// `failed` could not be applied; later operations were never attempted
    Failed {
        applied: Vec<PlannedOperation>,
        failed: PlannedOperation,
        error: ExecutionError,
    },

    /// Cancelled between operations
    Cancelled {
        applied: Vec<PlannedOperation>,
        remaining: usize,
    },
}

impl ExecutionResult {
    pub fn applied(&self) -> &[PlannedOperation] {
        match self {
            Self::Completed { applied }
            | Self::Failed { applied, .. }
            | Self::Cancelled { applied, .. } => applied,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Progress notifications emitted while executing
#[derive(Debug, Clone, Copy)]
pub enum ExecutionEvent<'a> {
    Started {
        index: usize,
        total: usize,
        operation: &'a PlannedOperation,
    },
    Finished {
        index: usize,
        total: usize,
        operation: &'a PlannedOperation,
    },
}

/// Shared flag set from a signal handler and polled between operations
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Applies plans through a [`CommandRunner`]
#[derive(Debug, Clone)]
pub struct Executor<R> {
    runner: R,
    command_timeout: Duration,
    cancel: CancelFlag,
}

impl Executor<SystemRunner> {
    pub fn system() -> Self {
        Self::new(SystemRunner)
    }
}

impl<R: CommandRunner> Executor<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            cancel: CancelFlag::default(),
        }
    }

    pub fn with_timeout(mut self, command_timeout: Duration) -> Self {
        self.command_timeout = command_timeout;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub async fn execute(&self, plan: Plan) -> ExecutionResult {
        self.execute_with(plan, |_| {}).await
    }

    /// Execute, reporting each operation to `on_event` as it starts and
    /// finishes
    pub async fn execute_with<F>(&self, plan: Plan, mut on_event: F) -> ExecutionResult
    where
        F: FnMut(ExecutionEvent<'_>),
    {
        let total = plan.len();
        let mut applied = Vec::with_capacity(total);
        for (index, operation) in plan.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(applied = applied.len(), "execution cancelled");
                return ExecutionResult::Cancelled {
                    applied,
                    remaining: total - index,
                };
            }

            on_event(ExecutionEvent::Started {
                index,
                total,
                operation: &operation,
            });
            tracing::debug!(index, op = %operation, "applying");

            if let Err(error) = self.apply(&operation).await {
                tracing::warn!(index, op = %operation, %error, "operation failed");
                return ExecutionResult::Failed {
                    applied,
                    failed: operation,
                    error,
                };
            }

            on_event(ExecutionEvent::Finished {
                index,
                total,
                operation: &operation,
            });
            applied.push(operation);
        }

        ExecutionResult::Completed { applied }
    }

    async fn apply(&self, operation: &PlannedOperation) -> Result<(), ExecutionError> {
        match operation {
            PlannedOperation::CreateDirectory { path } => fs::create_dir(path).await,
            PlannedOperation::WriteFile {
                path,
                contents,
                overwrite,
            } => fs::write_file(path, contents, *overwrite).await,
            PlannedOperation::RunCommand { argv, cwd } => {
                let cwd = if cwd.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    cwd.as_path()
                };
                let output = self.runner.run(argv, cwd, self.command_timeout).await?;
                if output.success() {
                    Ok(())
                } else {
                    Err(ExecutionError::NonZeroExit {
                        argv: argv.clone(),
                        code: output.code,
                        stderr: output.stderr_tail(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records commands and answers with a fixed exit code
    #[derive(Default)]
    struct ScriptedRunner {
        calls: RefCell<Vec<Vec<String>>>,
        fail_on: Option<&'static str>,
    }

    impl CommandRunner for ScriptedRunner {
        async fn run(
            &self,
            argv: &[String],
            _cwd: &Path,
            _limit: Duration,
        ) -> Result<CommandOutput, ExecutionError> {
            self.calls.borrow_mut().push(argv.to_vec());
            let code = match self.fail_on {
                Some(program) if argv[0] == program => 1,
                _ => 0,
            };
            Ok(CommandOutput {
                code: Some(code),
                stdout: String::new(),
                stderr: "boom\n".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_applies_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo");
        let plan = Plan::new(vec![
            PlannedOperation::create_dir(&root),
            PlannedOperation::write_file(root.join("a.txt"), "a", false),
            PlannedOperation::run(["npm", "install"], &root),
        ]);

        let executor = Executor::new(ScriptedRunner::default());
        let result = executor.execute(plan).await;

        assert!(result.is_success());
        assert_eq!(result.applied().len(), 3);
        assert_eq!(std::fs::read_to_string(root.join("a.txt")).unwrap(), "a");
        assert_eq!(executor.runner().calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo");
        let plan = Plan::new(vec![
            PlannedOperation::create_dir(&root),
            PlannedOperation::run(["npm", "install"], &root),
            PlannedOperation::write_file(root.join("after.txt"), "", false),
        ]);

        let runner = ScriptedRunner {
            fail_on: Some("npm"),
            ..Default::default()
        };
        let result = Executor::new(runner).execute(plan).await;

        match result {
            ExecutionResult::Failed {
                applied,
                failed,
                error,
            } => {
                assert_eq!(applied.len(), 1);
                assert!(failed.is_command());
                assert!(matches!(
                    error,
                    ExecutionError::NonZeroExit { code: Some(1), ref stderr, .. } if stderr == "boom"
                ));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!root.join("after.txt").exists());
    }

    #[tokio::test]
    async fn test_cancel_is_observed_between_operations() {
        let dir = tempfile::tempdir().unwrap();
        let plan = Plan::new(vec![
            PlannedOperation::create_dir(dir.path().join("a")),
            PlannedOperation::create_dir(dir.path().join("b")),
            PlannedOperation::create_dir(dir.path().join("c")),
        ]);

        let cancel = CancelFlag::new();
        let executor = Executor::new(ScriptedRunner::default()).with_cancel_flag(cancel.clone());
        let result = executor
            .execute_with(plan, |event| {
                if let ExecutionEvent::Finished { index: 0, .. } = event {
                    cancel.cancel();
                }
            })
            .await;

        match result {
            ExecutionResult::Cancelled { applied, remaining } => {
                assert_eq!(applied.len(), 1);
                assert_eq!(remaining, 2);
            }
            other => panic!("expected cancellation, got {:?}", other),
        }
        assert!(dir.path().join("a").is_dir());
        assert!(!dir.path().join("b").exists());
    }

    #[test]
    fn test_error_messages() {
        let err = ExecutionError::NonZeroExit {
            argv: vec!["npm".into(), "install".into()],
            code: Some(1),
            stderr: "ERR! network".into(),
        };
        assert_eq!(err.to_string(), "'npm install' exited with exit code 1:\nERR! network");

        let err = ExecutionError::TimedOut {
            argv: vec!["uv".into(), "sync".into()],
            limit: Duration::from_secs(600),
        };
        assert_eq!(err.to_string(), "'uv sync' timed out after 600s");

        let err = ExecutionError::TimedOut {
            argv: vec!["sleep".into()],
            limit: Duration::from_millis(300),
        };
        assert_eq!(err.to_string(), "'sleep' timed out after 300ms");
    }
}
