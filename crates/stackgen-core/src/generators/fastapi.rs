//! FastAPI backend. Hand-writes the whole tree; installs through uv or a
//! virtualenv when a Python package manager was chosen.
//!
//! With `ml_workspace` the backend also gets the layout of a model-serving
//! project: `data/`, `models/`, `notebooks/`, `experiments/`, `logs/`,
//! training and evaluation scripts, YAML configs and a model service.

use super::{render, GenerationContext, Generate, PlanningError};
use crate::config::PackageManager;
use crate::plan::PlannedOperation;

const MAIN_PY: &str = include_str!("../../templates/fastapi/main.py");
const CONFIG_PY: &str = include_str!("../../templates/fastapi/config.py");
const HEALTH_PY: &str = include_str!("../../templates/fastapi/health.py");
const PREDICTIONS_PY: &str = include_str!("../../templates/fastapi/predictions.py");
const PREDICTION_MODEL_PY: &str = include_str!("../../templates/fastapi/prediction.py");
const TEST_MAIN_PY: &str = include_str!("../../templates/fastapi/test_main.py");
const REQUIREMENTS: &str = include_str!("../../templates/fastapi/requirements.txt");
const REQUIREMENTS_DEV: &str = include_str!("../../templates/fastapi/requirements-dev.txt");
const PYPROJECT: &str = include_str!("../../templates/fastapi/pyproject.toml");
const ENV_EXAMPLE: &str = include_str!("../../templates/fastapi/env.example");
const DOCKERFILE: &str = include_str!("../../templates/fastapi/Dockerfile");

const DIRECTORIES: &[&str] = &["app", "app/core", "app/routers", "app/models", "tests"];

const ML_DIRECTORIES: &[&str] = &[
    "app/ml",
    "app/services",
    "data",
    "data/raw",
    "data/processed",
    "data/external",
    "models",
    "models/trained",
    "models/checkpoints",
    "notebooks",
    "experiments",
    "logs",
    "scripts",
    "config",
    "static",
    "static/assets",
];

/// Directories that start out empty and are kept in git with a `.gitkeep`
const ML_KEEP: &[&str] = &[
    "data/raw",
    "data/processed",
    "data/external",
    "models/trained",
    "models/checkpoints",
    "notebooks",
    "experiments",
    "logs",
    "static/assets",
];

const ML_FILES: &[(&str, &str)] = &[
    ("app/ml/__init__.py", ""),
    ("app/ml/base_model.py", include_str!("../../templates/fastapi/ml/base_model.py")),
    ("app/ml/paths.py", include_str!("../../templates/fastapi/ml/paths.py")),
    ("app/ml/data_loader.py", include_str!("../../templates/fastapi/ml/data_loader.py")),
    ("app/services/__init__.py", ""),
    (
        "app/services/model_service.py",
        include_str!("../../templates/fastapi/ml/model_service.py"),
    ),
    (
        "tests/test_model_service.py",
        include_str!("../../templates/fastapi/ml/test_model_service.py"),
    ),
    ("scripts/train_model.py", include_str!("../../templates/fastapi/ml/train_model.py")),
    (
        "scripts/evaluate_model.py",
        include_str!("../../templates/fastapi/ml/evaluate_model.py"),
    ),
    ("config/model_config.yaml", include_str!("../../templates/fastapi/ml/model_config.yaml")),
    ("config/data_config.yaml", include_str!("../../templates/fastapi/ml/data_config.yaml")),
    ("requirements-ml.txt", include_str!("../../templates/fastapi/ml/requirements-ml.txt")),
];

const ML_OPTIONAL_DEPENDENCIES: &str = r#"
[project.optional-dependencies]
ml = [
    "numpy>=1.26",
    "pandas>=2.2",
    "scikit-learn>=1.4",
    "pyyaml>=6.0",
]
"#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FastApiGenerator;

impl Generate for FastApiGenerator {
    fn name(&self) -> &'static str {
        "FastAPI"
    }

    fn delegates(&self) -> bool {
        false
    }

    fn generate(&self, ctx: &GenerationContext<'_>) -> Result<Vec<PlannedOperation>, PlanningError> {
        let dir = &ctx.layout.backend_dir;
        let ml = ctx.config.ml_workspace;
        let optional_dependencies = if ml { ML_OPTIONAL_DEPENDENCIES } else { "" };
        let vars = [
            ("project_name", ctx.config.name.as_str()),
            ("optional_dependencies", optional_dependencies),
        ];

        let ml_directories: &[&str] = if ml { ML_DIRECTORIES } else { &[] };
        let mut ops: Vec<PlannedOperation> = DIRECTORIES
            .iter()
            .chain(ml_directories)
            .map(|d| PlannedOperation::create_dir(dir.join(d)))
            .collect();

        let files: [(&str, &str); 14] = [
            ("app/__init__.py", ""),
            ("app/main.py", MAIN_PY),
            ("app/core/__init__.py", ""),
            ("app/core/config.py", CONFIG_PY),
            ("app/routers/__init__.py", ""),
            ("app/routers/health.py", HEALTH_PY),
            ("app/routers/predictions.py", PREDICTIONS_PY),
            ("app/models/__init__.py", ""),
            ("app/models/prediction.py", PREDICTION_MODEL_PY),
            ("tests/__init__.py", ""),
            ("tests/test_main.py", TEST_MAIN_PY),
            ("requirements.txt", REQUIREMENTS),
            ("requirements-dev.txt", REQUIREMENTS_DEV),
            ("pyproject.toml", PYPROJECT),
        ];
        for (path, template) in files {
            ops.push(ctx.write(dir.join(path), render(template, &vars)));
        }
        ops.push(ctx.write(dir.join(".env.example"), render(ENV_EXAMPLE, &vars)));

        if ml {
            for (path, template) in ML_FILES {
                ops.push(ctx.write(dir.join(path), render(template, &vars)));
            }
            for keep in ML_KEEP {
                ops.push(ctx.write(dir.join(keep).join(".gitkeep"), ""));
            }
        }

        if ctx.config.docker {
            let requirements = if ml { "requirements-ml.txt" } else { "requirements.txt" };
            ops.push(ctx.write(
                dir.join("Dockerfile"),
                render(DOCKERFILE, &[("requirements", requirements)]),
            ));
        }

        if ctx.config.install {
            match ctx.config.package_manager {
                PackageManager::Uv => {
                    let mut argv = vec!["uv", "sync"];
                    if ml {
                        argv.extend(["--extra", "ml"]);
                    }
                    ops.push(PlannedOperation::run(argv, dir));
                }
                PackageManager::Pip => {
                    ops.push(PlannedOperation::run(["python3", "-m", "venv", ".venv"], dir));
                    let mut argv = vec![venv_pip(), "install", "-r", "requirements-dev.txt"];
                    if ml {
                        argv.extend(["-r", "requirements-ml.txt"]);
                    }
                    ops.push(PlannedOperation::run(argv, dir));
                }
                // the frontend's manager can't install Python packages
                PackageManager::Npm | PackageManager::Yarn | PackageManager::Pnpm => {}
            }
        }

        Ok(ops)
    }
}

/// pip inside the project virtualenv, relative to the backend directory
fn venv_pip() -> &'static str {
    if cfg!(windows) {
        ".venv/Scripts/pip.exe"
    } else {
        ".venv/bin/pip"
    }
}
