//! Vite + React. The project files are written directly instead of going
//! through `npm create vite`, so the tree does not depend on whatever the
//! upstream template currently looks like. Dependencies come from
//! `<pm> install`.

use super::{render, GenerationContext, Generate, PlanningError};
use crate::plan::PlannedOperation;

const PACKAGE_JSON: &str = include_str!("../../templates/vite/package.json");
const VITE_CONFIG: &str = include_str!("../../templates/vite/vite.config");
const INDEX_HTML: &str = include_str!("../../templates/vite/index.html");
const MAIN: &str = include_str!("../../templates/vite/main");
const APP: &str = include_str!("../../templates/vite/App");
const INDEX_CSS: &str = include_str!("../../templates/vite/index.css");
const APP_CSS: &str = include_str!("../../templates/vite/App.css");
const TSCONFIG: &str = include_str!("../../templates/vite/tsconfig.json");
const VITE_ENV: &str = include_str!("../../templates/vite/vite-env.d.ts");

const TYPE_DEPENDENCIES: &str = r#"    "@types/react": "^18.3.3",
    "@types/react-dom": "^18.3.0",
    "typescript": "^5.5.3",
"#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViteGenerator;

impl Generate for ViteGenerator {
    fn name(&self) -> &'static str {
        "Vite"
    }

    fn delegates(&self) -> bool {
        false
    }

    fn generate(&self, ctx: &GenerationContext<'_>) -> Result<Vec<PlannedOperation>, PlanningError> {
        let pm = ctx.js_package_manager(self.name())?;
        let dir = &ctx.layout.frontend_dir;
        let lang = ctx.config.language;
        let ts = lang.is_typescript();

        let vars = [
            ("project_name", ctx.config.name.as_str()),
            ("jsx_ext", lang.jsx_ext()),
            ("build_command", if ts { "tsc && vite build" } else { "vite build" }),
            ("type_dependencies", if ts { TYPE_DEPENDENCIES } else { "" }),
            ("non_null", if ts { "!" } else { "" }),
        ];

        let mut ops = vec![
            PlannedOperation::create_dir(dir.join("src")),
            PlannedOperation::create_dir(dir.join("public")),
            ctx.write(dir.join("package.json"), render(PACKAGE_JSON, &vars)),
            ctx.write(
                dir.join(format!("vite.config.{}", lang.module_ext())),
                VITE_CONFIG,
            ),
            ctx.write(dir.join("index.html"), render(INDEX_HTML, &vars)),
            ctx.write(
                dir.join(format!("src/main.{}", lang.jsx_ext())),
                render(MAIN, &vars),
            ),
            ctx.write(
                dir.join(format!("src/App.{}", lang.jsx_ext())),
                render(APP, &vars),
            ),
            ctx.write(dir.join("src/index.css"), INDEX_CSS),
            ctx.write(dir.join("src/App.css"), APP_CSS),
        ];

        if ts {
            ops.push(ctx.write(dir.join("tsconfig.json"), TSCONFIG));
            ops.push(ctx.write(dir.join("src/vite-env.d.ts"), VITE_ENV));
        }

        if ctx.config.install {
            ops.push(PlannedOperation::run(pm.install_all(), dir));
        }

        Ok(ops)
    }
}
