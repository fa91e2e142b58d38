//! Structure planning: configuration in, ordered operations out
//!
//! The planner asks each selected generator for its fragment and
//! concatenates the fragments in a fixed order:
//!
//! 1. the project root directory
//! 2. the backend
//! 3. the frontend (base generator, styling, folder structure, packages)
//! 4. shared top-level files (README, .gitignore, docker, docs)
//!
//! Inside a fragment every directory is created before any file beneath
//! it. Commands are barriers: nothing is moved across a `RunCommand`,
//! since a delegating scaffolder has to run before files land in the
//! tree it creates. Nothing here touches the disk.

mod operation;

pub use operation::{Plan, PlanFormat, PlannedOperation};

use crate::config::ProjectConfig;
use crate::generators::{self, FrameworkGenerator, GenerationContext, Generate, PlanningError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Where each component lives inside the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub backend_dir: PathBuf,
    pub frontend_dir: PathBuf,
}

impl Layout {
    /// Full-stack projects get `backend/` and `frontend/` subdirectories;
    /// single-component projects live directly in the root.
    pub fn for_config(config: &ProjectConfig) -> Self {
        let root = config.project_root();
        if config.is_full_stack() {
            Self {
                backend_dir: root.join("backend"),
                frontend_dir: root.join("frontend"),
                root,
            }
        } else {
            Self {
                backend_dir: root.clone(),
                frontend_dir: root.clone(),
                root,
            }
        }
    }
}

/// Expand a configuration into an ordered plan.
///
/// The configuration is expected to have passed validation; generators
/// still refuse inconsistent combinations with a `PlanningError`.
pub fn plan(config: &ProjectConfig) -> Result<Plan, PlanningError> {
    let layout = Layout::for_config(config);
    let ctx = GenerationContext::new(config, &layout);
    let mut builder = PlanBuilder::default();

    builder.push_fragment(vec![PlannedOperation::create_dir(&layout.root)]);

    if let Some(backend) = FrameworkGenerator::for_backend(config.backend) {
        builder.push_fragment(backend.generate(&ctx)?);
    }

    let frontend = FrameworkGenerator::for_frontend(config.frontend);
    if let Some(frontend) = &frontend {
        builder.push_fragment(frontend.generate(&ctx)?);
        builder.push_fragment(generators::styling::generate(&ctx)?);
        builder.push_fragment(generators::structure::folder_structure(&ctx));
        builder.push_fragment(generators::structure::common_packages(&ctx)?);
    }

    builder.push_fragment(generators::shared::generate(&ctx, frontend.as_ref()));

    Ok(builder.finish())
}

/// Accumulates fragments, enforcing directory-before-contents ordering
#[derive(Debug, Default)]
struct PlanBuilder {
    operations: Vec<PlannedOperation>,
    created: HashSet<PathBuf>,
}

impl PlanBuilder {
    fn push_fragment(&mut self, fragment: Vec<PlannedOperation>) {
        let mut segment = Vec::new();
        for op in fragment {
            if op.is_command() {
                self.flush_segment(std::mem::take(&mut segment));
                self.operations.push(op);
            } else {
                segment.push(op);
            }
        }
        self.flush_segment(segment);
    }

    /// Emit one command-free run: directories (shallowest first, with any
    /// missing file parents added) followed by file writes in their
    /// original order.
    fn flush_segment(&mut self, segment: Vec<PlannedOperation>) {
        let mut dirs: Vec<PathBuf> = Vec::new();
        let mut files = Vec::new();

        for op in segment {
            match op {
                PlannedOperation::CreateDirectory { path } => dirs.push(path),
                write @ PlannedOperation::WriteFile { .. } => {
                    if let Some(parent) = write
                        .target()
                        .and_then(Path::parent)
                        .filter(|p| !p.as_os_str().is_empty())
                    {
                        dirs.push(parent.to_path_buf());
                    }
                    files.push(write);
                }
                PlannedOperation::RunCommand { .. } => unreachable!("commands split segments"),
            }
        }

        // stable: equal depth keeps fragment order
        dirs.sort_by_key(|d| depth(d));
        for dir in dirs {
            if self.created.insert(dir.clone()) {
                self.operations.push(PlannedOperation::CreateDirectory { path: dir });
            }
        }
        self.operations.extend(files);
    }

    fn finish(self) -> Plan {
        Plan::new(self.operations)
    }
}

fn depth(path: &Path) -> usize {
    path.components().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Backend, Frontend, PackageManager, Styling};

    fn position(plan: &Plan, pred: impl Fn(&PlannedOperation) -> bool) -> usize {
        plan.iter()
            .position(pred)
            .expect("operation missing from plan")
    }

    fn is_dir(path: &str) -> impl Fn(&PlannedOperation) -> bool + '_ {
        move |op| matches!(op, PlannedOperation::CreateDirectory { path: p } if p == Path::new(path))
    }

    fn is_write(path: &str) -> impl Fn(&PlannedOperation) -> bool + '_ {
        move |op| matches!(op, PlannedOperation::WriteFile { path: p, .. } if p == Path::new(path))
    }

    #[test]
    fn test_vite_tailwind_scenario_order() {
        let config = ProjectConfig::new("demo", "")
            .with_frontend(Frontend::Vite)
            .with_styling(Styling::Tailwind);
        let plan = plan(&config).unwrap();

        let root = position(&plan, is_dir("demo"));
        let src = position(&plan, is_dir("demo/src"));
        let package_json = position(&plan, is_write("demo/package.json"));
        let install = position(&plan, |op| {
            matches!(op, PlannedOperation::RunCommand { argv, cwd }
                if argv[..2] == ["npm", "install"] && cwd == Path::new("demo"))
        });

        assert!(root < src);
        assert!(src < package_json);
        assert!(package_json < install);
    }

    #[test]
    fn test_fastapi_scenario_has_no_frontend_tooling() {
        let config = ProjectConfig::new("api", "")
            .with_backend(Backend::FastApi)
            .with_package_manager(PackageManager::Uv);
        let plan = plan(&config).unwrap();

        let app = position(&plan, is_dir("api/app"));
        let main = position(&plan, is_write("api/app/main.py"));
        assert!(app < main);

        for argv in plan.commands() {
            assert!(
                !["npm", "npx", "yarn", "pnpm"].contains(&argv[0].as_str()),
                "unexpected frontend command {:?}",
                argv
            );
        }
    }

    #[test]
    fn test_full_stack_layout() {
        let config = ProjectConfig::new("genai", "/work")
            .with_backend(Backend::FastApi)
            .with_frontend(Frontend::Vite);
        let layout = Layout::for_config(&config);
        assert_eq!(layout.backend_dir, PathBuf::from("/work/genai/backend"));
        assert_eq!(layout.frontend_dir, PathBuf::from("/work/genai/frontend"));

        let plan = plan(&config).unwrap();
        let backend_main = position(&plan, is_write("/work/genai/backend/app/main.py"));
        let frontend_pkg = position(&plan, is_write("/work/genai/frontend/package.json"));
        let readme = position(&plan, is_write("/work/genai/README.md"));
        assert!(backend_main < frontend_pkg);
        assert!(frontend_pkg < readme);
    }

    #[test]
    fn test_delegated_scaffolder_runs_before_files_in_its_tree() {
        let config = ProjectConfig::new("site", "/work").with_frontend(Frontend::NextJs);
        let plan = plan(&config).unwrap();

        let scaffold = position(&plan, |op| {
            matches!(op, PlannedOperation::RunCommand { argv, .. }
                if argv.iter().any(|a| a.starts_with("create-next-app")))
        });
        let vscode_dir = position(&plan, is_dir("/work/site/.vscode"));
        let prettier = position(&plan, is_write("/work/site/.prettierrc"));
        assert!(scaffold < vscode_dir);
        assert!(scaffold < prettier);
    }

    #[test]
    fn test_builder_inserts_missing_parents_shallowest_first() {
        let mut builder = PlanBuilder::default();
        builder.push_fragment(vec![
            PlannedOperation::write_file("p/a/b/file.txt", "", false),
            PlannedOperation::create_dir("p"),
            PlannedOperation::write_file("p/top.txt", "", false),
        ]);
        let ops = builder.finish().into_operations();
        assert_eq!(
            ops,
            vec![
                PlannedOperation::create_dir("p"),
                PlannedOperation::create_dir("p/a/b"),
                PlannedOperation::write_file("p/a/b/file.txt", "", false),
                PlannedOperation::write_file("p/top.txt", "", false),
            ]
        );
    }

    #[test]
    fn test_builder_never_reorders_across_commands() {
        let mut builder = PlanBuilder::default();
        builder.push_fragment(vec![
            PlannedOperation::run(["tool"], "."),
            PlannedOperation::create_dir("x"),
        ]);
        let ops = builder.finish().into_operations();
        assert!(ops[0].is_command());
        assert_eq!(ops[1], PlannedOperation::create_dir("x"));
    }

    #[test]
    fn test_directories_are_not_repeated() {
        let mut builder = PlanBuilder::default();
        builder.push_fragment(vec![PlannedOperation::create_dir("p")]);
        builder.push_fragment(vec![PlannedOperation::write_file("p/a", "", false)]);
        let ops = builder.finish().into_operations();
        assert_eq!(ops.len(), 2);
    }
}
