//! Create React App. Fully delegated to `create-react-app`, which creates
//! the directory, writes the template and installs dependencies itself.

use super::{scaffold_location, GenerationContext, Generate, PlanningError};
use crate::config::PackageManager;
use crate::plan::PlannedOperation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CraGenerator;

impl Generate for CraGenerator {
    fn name(&self) -> &'static str {
        "Create React App"
    }

    fn delegates(&self) -> bool {
        true
    }

    fn generate(&self, ctx: &GenerationContext<'_>) -> Result<Vec<PlannedOperation>, PlanningError> {
        let pm = ctx.js_package_manager(self.name())?;
        if pm == PackageManager::Pnpm {
            return Err(PlanningError::IncompatibleOption {
                framework: self.name(),
                option: "pnpm".to_string(),
            });
        }

        let (cwd, dir_name) = scaffold_location(&ctx.layout.frontend_dir)?;
        let mut argv = vec!["npx".to_string(), "create-react-app".to_string(), dir_name];
        if ctx.config.language.is_typescript() {
            argv.extend(["--template".to_string(), "typescript".to_string()]);
        }
        if pm == PackageManager::Npm {
            argv.push("--use-npm".to_string());
        }

        Ok(vec![PlannedOperation::run(argv, cwd)])
    }
}
