//! Framework generators
//!
//! Each generator turns a resolved configuration into the plan fragment
//! for one framework. The set is closed: [`FrameworkGenerator`] holds one
//! variant per framework and dispatches through [`Generate`].
//!
//! | Generator | Hand-written                                   | Delegated to              |
//! |-----------|------------------------------------------------|---------------------------|
//! | FastAPI   | everything                                     | `uv sync` / venv + pip    |
//! | Vite      | everything                                     | `<pm> install`            |
//! | CRA       | nothing                                        | `npx create-react-app`    |
//! | Next.js   | `.prettierrc`, `.vscode/settings.json`         | `npx create-next-app`     |
//!
//! The styling, folder-structure, common-package and shared steps run after
//! the base generator and live in their own modules.

pub mod cra;
pub mod fastapi;
pub mod nextjs;
pub mod shared;
pub mod structure;
pub mod styling;
pub mod vite;

use crate::config::{Backend, Frontend, PackageManager, ProjectConfig};
use crate::plan::{Layout, PlannedOperation};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use cra::CraGenerator;
pub use fastapi::FastApiGenerator;
pub use nextjs::NextJsGenerator;
pub use vite::ViteGenerator;

/// A generator found the configuration inconsistent at planning time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    #[error("{framework} needs a JavaScript package manager, got '{package_manager}'")]
    MissingPackageManager {
        framework: &'static str,
        package_manager: PackageManager,
    },

    #[error("{framework} cannot be combined with {option}")]
    IncompatibleOption {
        framework: &'static str,
        option: String,
    },

    #[error("cannot derive a directory name from {}", .0.display())]
    InvalidTarget(PathBuf),
}

/// Everything a generator may look at
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub config: &'a ProjectConfig,
    pub layout: &'a Layout,
}

impl<'a> GenerationContext<'a> {
    pub fn new(config: &'a ProjectConfig, layout: &'a Layout) -> Self {
        Self { config, layout }
    }

    /// File write that honours the project's overwrite flag
    pub fn write(&self, path: impl Into<PathBuf>, contents: impl Into<String>) -> PlannedOperation {
        PlannedOperation::write_file(path, contents, self.config.overwrite)
    }

    /// File write that replaces a file an earlier step produced
    pub fn replace(&self, path: impl Into<PathBuf>, contents: impl Into<String>) -> PlannedOperation {
        PlannedOperation::write_file(path, contents, true)
    }

    /// JavaScript package manager, or an error naming the framework
    pub fn js_package_manager(&self, framework: &'static str) -> Result<PackageManager, PlanningError> {
        let pm = self.config.package_manager;
        if pm.is_javascript() {
            Ok(pm)
        } else {
            Err(PlanningError::MissingPackageManager {
                framework,
                package_manager: pm,
            })
        }
    }
}

/// Capability shared by all framework generators
pub trait Generate {
    /// Framework name used in messages
    fn name(&self) -> &'static str;

    /// Whether the framework's own scaffolder creates the tree
    fn delegates(&self) -> bool;

    /// Produce the operations that scaffold this framework
    fn generate(&self, ctx: &GenerationContext<'_>) -> Result<Vec<PlannedOperation>, PlanningError>;
}

/// The closed set of framework generators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkGenerator {
    FastApi(FastApiGenerator),
    Vite(ViteGenerator),
    Cra(CraGenerator),
    NextJs(NextJsGenerator),
}

impl FrameworkGenerator {
    pub fn for_backend(backend: Backend) -> Option<Self> {
        match backend {
            Backend::None => None,
            Backend::FastApi => Some(Self::FastApi(FastApiGenerator)),
        }
    }

    pub fn for_frontend(frontend: Frontend) -> Option<Self> {
        match frontend {
            Frontend::None => None,
            Frontend::Vite => Some(Self::Vite(ViteGenerator)),
            Frontend::Cra => Some(Self::Cra(CraGenerator)),
            Frontend::NextJs => Some(Self::NextJs(NextJsGenerator)),
        }
    }

    fn inner(&self) -> &dyn Generate {
        match self {
            Self::FastApi(g) => g,
            Self::Vite(g) => g,
            Self::Cra(g) => g,
            Self::NextJs(g) => g,
        }
    }
}

impl Generate for FrameworkGenerator {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn delegates(&self) -> bool {
        self.inner().delegates()
    }

    fn generate(&self, ctx: &GenerationContext<'_>) -> Result<Vec<PlannedOperation>, PlanningError> {
        self.inner().generate(ctx)
    }
}

/// Replace `{{key}}` placeholders in a template
pub(crate) fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{{{}}}}}", key), value)
    })
}

/// Working directory and directory argument for a scaffolder that creates
/// `target` itself
pub(crate) fn scaffold_location(target: &Path) -> Result<(PathBuf, String), PlanningError> {
    let name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PlanningError::InvalidTarget(target.to_path_buf()))?
        .to_string();
    let cwd = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((cwd, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_all_placeholders() {
        let out = render(
            "# {{project_name}}\n{{project_name}} on {{port}}",
            &[("project_name", "demo"), ("port", "8000")],
        );
        assert_eq!(out, "# demo\ndemo on 8000");
    }

    #[test]
    fn test_scaffold_location_relative_target() {
        let (cwd, name) = scaffold_location(Path::new("demo")).unwrap();
        assert_eq!(cwd, PathBuf::from("."));
        assert_eq!(name, "demo");

        let (cwd, name) = scaffold_location(Path::new("/work/app/frontend")).unwrap();
        assert_eq!(cwd, PathBuf::from("/work/app"));
        assert_eq!(name, "frontend");
    }

    #[test]
    fn test_generator_selection() {
        assert!(FrameworkGenerator::for_backend(Backend::None).is_none());
        assert!(FrameworkGenerator::for_frontend(Frontend::None).is_none());

        let next = FrameworkGenerator::for_frontend(Frontend::NextJs).unwrap();
        assert!(next.delegates());
        assert_eq!(next.name(), "Next.js");

        let vite = FrameworkGenerator::for_frontend(Frontend::Vite).unwrap();
        assert!(!vite.delegates());
    }
}
