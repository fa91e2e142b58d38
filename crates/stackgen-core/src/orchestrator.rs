//! Validate → plan → execute, for one fully-resolved configuration

use crate::config::{PackageManager, ProjectConfig};
use crate::exec::{CommandRunner, ExecutionError, ExecutionEvent, ExecutionResult, Executor};
use crate::generators::PlanningError;
use crate::plan::{self, Plan, PlannedOperation};
use crate::validate::{validate, ValidationError};
use thiserror::Error;

/// Anything that stops a project from being generated
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error("{operation} failed after {applied} operations: {source}")]
    Execution {
        operation: PlannedOperation,
        applied: usize,
        #[source]
        source: ExecutionError,
    },

    #[error("cancelled after {applied} operations ({remaining} not attempted)")]
    Cancelled { applied: usize, remaining: usize },
}

impl ScaffoldError {
    /// Whether the disk may have been changed before the error
    pub fn left_partial_output(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Planning(_) => false,
            Self::Execution { applied, .. } | Self::Cancelled { applied, .. } => *applied > 0,
        }
    }
}

impl ExecutionResult {
    /// Applied operations on success, otherwise the failure as a
    /// [`ScaffoldError`]
    pub fn into_result(self) -> Result<Vec<PlannedOperation>, ScaffoldError> {
        match self {
            ExecutionResult::Completed { applied } => Ok(applied),
            ExecutionResult::Failed {
                applied,
                failed,
                error,
            } => Err(ScaffoldError::Execution {
                operation: failed,
                applied: applied.len(),
                source: error,
            }),
            ExecutionResult::Cancelled { applied, remaining } => Err(ScaffoldError::Cancelled {
                applied: applied.len(),
                remaining,
            }),
        }
    }
}

/// Validate and plan without touching the disk
pub fn prepare(config: &ProjectConfig) -> Result<Plan, ScaffoldError> {
    validate(config)?;
    let plan = plan::plan(config)?;
    tracing::debug!(operations = plan.len(), project = %config.name, "planned");
    Ok(plan)
}

/// Validate, plan and execute
pub async fn scaffold<R: CommandRunner>(
    config: &ProjectConfig,
    executor: &Executor<R>,
) -> Result<ExecutionResult, ScaffoldError> {
    scaffold_with(config, executor, |_| {}).await
}

/// [`scaffold`], reporting progress to `on_event`
pub async fn scaffold_with<R, F>(
    config: &ProjectConfig,
    executor: &Executor<R>,
    on_event: F,
) -> Result<ExecutionResult, ScaffoldError>
where
    R: CommandRunner,
    F: FnMut(ExecutionEvent<'_>),
{
    let plan = prepare(config)?;
    tracing::info!(project = %config.name, root = %config.project_root().display(), "generating");
    Ok(executor.execute_with(plan, on_event).await)
}

/// Shell commands to get the generated project running
pub fn next_steps(config: &ProjectConfig) -> Vec<String> {
    let mut steps = vec![format!("cd {}", config.project_root().display())];
    let full_stack = config.is_full_stack();

    if !config.backend.is_none() {
        let prefix = if full_stack { "cd backend && " } else { "" };
        let (uv_extra, pip_extra) = if config.ml_workspace {
            (" --extra ml", " -r requirements-ml.txt")
        } else {
            ("", "")
        };
        let run = match config.package_manager {
            PackageManager::Uv => {
                if config.install {
                    "uv run uvicorn app.main:app --reload".to_string()
                } else {
                    format!("uv sync{} && uv run uvicorn app.main:app --reload", uv_extra)
                }
            }
            PackageManager::Pip if config.install => {
                "source .venv/bin/activate && uvicorn app.main:app --reload".to_string()
            }
            _ => format!(
                "python3 -m venv .venv && source .venv/bin/activate && \
                 pip install -r requirements-dev.txt{} && uvicorn app.main:app --reload",
                pip_extra
            ),
        };
        steps.push(format!("{}{}", prefix, run));
    }

    if !config.frontend.is_none() {
        let pm = config.package_manager;
        let prefix = if full_stack { "cd frontend && " } else { "" };
        let install = if config.install {
            String::new()
        } else {
            format!("{} && ", pm.install_all().join(" "))
        };
        steps.push(format!("{}{}{}", prefix, install, config.frontend.dev_command(pm)));
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Backend, Frontend, Styling};

    #[test]
    fn test_prepare_rejects_before_planning() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig::new("demo", dir.path())
            .with_frontend(Frontend::Vite)
            .with_styling(Styling::CssModules);
        assert!(matches!(
            prepare(&config),
            Err(ScaffoldError::Validation(ValidationError::UnsupportedStyling { .. }))
        ));
        assert!(!dir.path().join("demo").exists());
    }

    #[test]
    fn test_prepare_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig::new("genai", dir.path())
            .with_backend(Backend::FastApi)
            .with_frontend(Frontend::NextJs)
            .with_styling(Styling::StyledComponents)
            .with_docker(true);
        assert_eq!(prepare(&config).unwrap(), prepare(&config).unwrap());
    }

    #[test]
    fn test_next_steps_full_stack() {
        let config = ProjectConfig::new("genai", "/work")
            .with_backend(Backend::FastApi)
            .with_frontend(Frontend::Vite);
        let steps = next_steps(&config);
        assert_eq!(steps[0], "cd /work/genai");
        assert!(steps[1].starts_with("cd backend && python3 -m venv"));
        assert_eq!(steps[2], "cd frontend && npm run dev");
    }

    #[test]
    fn test_next_steps_install_ml_extras() {
        let config = ProjectConfig::new("genai", "/work")
            .with_backend(Backend::FastApi)
            .with_frontend(Frontend::Vite)
            .with_ml_workspace(true);
        assert!(next_steps(&config)[1].contains("pip install -r requirements-dev.txt -r requirements-ml.txt"));

        let uv = ProjectConfig::new("genai", "/work")
            .with_backend(Backend::FastApi)
            .with_package_manager(PackageManager::Uv)
            .with_ml_workspace(true)
            .with_install(false);
        assert!(next_steps(&uv)[1].starts_with("uv sync --extra ml && "));
    }

    #[test]
    fn test_next_steps_without_install() {
        let config = ProjectConfig::new("demo", "")
            .with_frontend(Frontend::Cra)
            .with_package_manager(PackageManager::Yarn)
            .with_install(false);
        assert_eq!(next_steps(&config)[1], "yarn install && yarn start");
    }

    #[test]
    fn test_partial_output_flag() {
        let err = ScaffoldError::Cancelled {
            applied: 0,
            remaining: 3,
        };
        assert!(!err.left_partial_output());
        let err = ScaffoldError::Execution {
            operation: PlannedOperation::run(["npm", "install"], "demo"),
            applied: 4,
            source: ExecutionError::EmptyCommand,
        };
        assert!(err.left_partial_output());
    }
}
