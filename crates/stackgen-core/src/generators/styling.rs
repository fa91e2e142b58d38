//! Styling step, applied on top of the base frontend

use super::{render, GenerationContext, PlanningError};
use crate::config::{Frontend, Styling};
use crate::plan::PlannedOperation;

const TAILWIND_CONFIG: &str = include_str!("../../templates/styling/tailwind.config.js");
const POSTCSS_CONFIG: &str = include_str!("../../templates/styling/postcss.config.js");
const TAILWIND_CSS: &str = include_str!("../../templates/styling/tailwind.css");
const CSS_MODULE: &str = include_str!("../../templates/styling/variables.module.css");
const NEXT_REGISTRY: &str = include_str!("../../templates/nextjs/registry");

/// Tailwind 4 moved configuration out of `tailwind.config.js`
const TAILWIND_PACKAGES: &[&str] = &["tailwindcss@3", "postcss", "autoprefixer"];
const STYLED_COMPONENTS_PACKAGES: &[&str] = &["styled-components"];
const EMOTION_PACKAGES: &[&str] = &["@emotion/react", "@emotion/styled"];

pub fn generate(ctx: &GenerationContext<'_>) -> Result<Vec<PlannedOperation>, PlanningError> {
    let config = ctx.config;
    let frontend = config.frontend;
    let dir = &ctx.layout.frontend_dir;
    let mut ops = Vec::new();

    if frontend.is_none() || config.styling == Styling::None {
        return Ok(ops);
    }
    if !frontend.supports_styling(config.styling) {
        return Err(PlanningError::IncompatibleOption {
            framework: frontend.display_name(),
            option: config.styling.display_name().to_string(),
        });
    }

    let pm = ctx.js_package_manager(frontend.display_name())?;
    let add = |packages: &[&str], dev: bool, ops: &mut Vec<PlannedOperation>| {
        if config.install {
            if let Some(argv) = pm.add(packages, dev) {
                ops.push(PlannedOperation::run(argv, dir));
            }
        }
    };

    match config.styling {
        Styling::None => {}
        // configured by create-next-app --tailwind
        Styling::Tailwind if frontend == Frontend::NextJs => {}
        Styling::Tailwind => {
            add(TAILWIND_PACKAGES, true, &mut ops);
            // CRA projects are CommonJS, Vite projects are ES modules
            let module_export = if frontend == Frontend::Cra {
                "module.exports ="
            } else {
                "export default"
            };
            let vars = [("module_export", module_export)];
            ops.push(ctx.write(dir.join("tailwind.config.js"), render(TAILWIND_CONFIG, &vars)));
            ops.push(ctx.write(dir.join("postcss.config.js"), render(POSTCSS_CONFIG, &vars)));
            ops.push(ctx.replace(dir.join("src/index.css"), TAILWIND_CSS));
        }
        Styling::StyledComponents => {
            add(STYLED_COMPONENTS_PACKAGES, false, &mut ops);
            if frontend == Frontend::NextJs {
                let children_type = if config.language.is_typescript() {
                    ": { children: React.ReactNode }"
                } else {
                    ""
                };
                ops.push(ctx.write(
                    dir.join(format!("src/lib/registry.{}", config.language.jsx_ext())),
                    render(NEXT_REGISTRY, &[("children_type", children_type)]),
                ));
            }
        }
        Styling::Emotion => add(EMOTION_PACKAGES, false, &mut ops),
        Styling::CssModules => {
            ops.push(ctx.write(dir.join("src/styles/variables.module.css"), CSS_MODULE));
        }
    }

    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProjectConfig, ScriptLanguage};
    use crate::plan::Layout;
    use std::path::Path;

    fn generate_for(config: &ProjectConfig) -> Vec<PlannedOperation> {
        let layout = Layout::for_config(config);
        generate(&GenerationContext::new(config, &layout)).unwrap()
    }

    #[test]
    fn test_tailwind_on_vite() {
        let config = ProjectConfig::new("demo", "")
            .with_frontend(Frontend::Vite)
            .with_styling(Styling::Tailwind);
        let ops = generate_for(&config);

        assert_eq!(
            ops[0],
            PlannedOperation::run(
                ["npm", "install", "-D", "tailwindcss@3", "postcss", "autoprefixer"],
                "demo"
            )
        );
        assert!(ops.iter().any(|op| matches!(op,
            PlannedOperation::WriteFile { path, overwrite: true, .. }
                if path == Path::new("demo/src/index.css"))));
        assert!(ops.iter().any(|op| matches!(op,
            PlannedOperation::WriteFile { path, contents, .. }
                if path == Path::new("demo/tailwind.config.js")
                    && contents.contains("export default"))));
    }

    #[test]
    fn test_tailwind_on_cra_uses_commonjs_and_skips_install_when_offline() {
        let config = ProjectConfig::new("web", "")
            .with_frontend(Frontend::Cra)
            .with_styling(Styling::Tailwind)
            .with_install(false);
        let ops = generate_for(&config);

        assert!(ops.iter().all(|op| !op.is_command()));
        assert!(ops.iter().any(|op| matches!(op,
            PlannedOperation::WriteFile { contents, .. } if contents.contains("module.exports ="))));
    }

    #[test]
    fn test_tailwind_on_nextjs_is_left_to_scaffolder() {
        let config = ProjectConfig::new("site", "")
            .with_frontend(Frontend::NextJs)
            .with_styling(Styling::Tailwind);
        assert!(generate_for(&config).is_empty());
    }

    #[test]
    fn test_styled_components_registry_for_nextjs() {
        let config = ProjectConfig::new("site", "")
            .with_frontend(Frontend::NextJs)
            .with_styling(Styling::StyledComponents)
            .with_language(ScriptLanguage::JavaScript);
        let ops = generate_for(&config);

        assert!(ops[0].is_command());
        assert!(ops.iter().any(|op| op.target() == Some(Path::new("site/src/lib/registry.jsx"))));
    }

    #[test]
    fn test_emotion_adds_two_packages() {
        let config = ProjectConfig::new("demo", "")
            .with_frontend(Frontend::Vite)
            .with_styling(Styling::Emotion)
            .with_package_manager(crate::config::PackageManager::Yarn);
        assert_eq!(
            generate_for(&config),
            vec![PlannedOperation::run(
                ["yarn", "add", "@emotion/react", "@emotion/styled"],
                "demo"
            )]
        );
    }

    #[test]
    fn test_disallowed_styling_is_a_planning_error() {
        let config = ProjectConfig::new("demo", "")
            .with_frontend(Frontend::Vite)
            .with_styling(Styling::CssModules);
        let layout = Layout::for_config(&config);
        assert!(matches!(
            generate(&GenerationContext::new(&config, &layout)),
            Err(PlanningError::IncompatibleOption { .. })
        ));
    }
}
