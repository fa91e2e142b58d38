//! Next.js. The tree comes from `create-next-app` (App Router, `src/`,
//! ESLint, `@/*` alias); editor settings are written on top afterwards.
//! Tailwind is chosen through the scaffolder flag rather than the styling
//! step.

use super::{scaffold_location, GenerationContext, Generate, PlanningError};
use crate::config::Styling;
use crate::plan::PlannedOperation;

const PRETTIERRC: &str = include_str!("../../templates/nextjs/prettierrc");
const VSCODE_SETTINGS: &str = include_str!("../../templates/nextjs/vscode-settings.json");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NextJsGenerator;

impl Generate for NextJsGenerator {
    fn name(&self) -> &'static str {
        "Next.js"
    }

    fn delegates(&self) -> bool {
        true
    }

    fn generate(&self, ctx: &GenerationContext<'_>) -> Result<Vec<PlannedOperation>, PlanningError> {
        let pm = ctx.js_package_manager(self.name())?;
        let config = ctx.config;
        let dir = &ctx.layout.frontend_dir;
        let (cwd, dir_name) = scaffold_location(dir)?;

        let mut argv: Vec<String> = vec!["npx".into(), "create-next-app@latest".into(), dir_name];
        argv.push(if config.language.is_typescript() { "--ts" } else { "--js" }.into());
        argv.push(
            if config.styling == Styling::Tailwind {
                "--tailwind"
            } else {
                "--no-tailwind"
            }
            .into(),
        );
        argv.extend(
            ["--eslint", "--app", "--src-dir", "--import-alias", "@/*"]
                .into_iter()
                .map(String::from),
        );
        argv.push(format!("--use-{}", pm.binary()));
        if !config.install {
            argv.push("--skip-install".into());
        }
        argv.push("--yes".into());

        Ok(vec![
            PlannedOperation::run(argv, cwd),
            ctx.write(dir.join(".prettierrc"), PRETTIERRC),
            PlannedOperation::create_dir(dir.join(".vscode")),
            ctx.write(dir.join(".vscode/settings.json"), VSCODE_SETTINGS),
        ])
    }
}
