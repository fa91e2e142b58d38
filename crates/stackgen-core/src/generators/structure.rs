//! Extended frontend folder layout and the common package set

use super::{GenerationContext, PlanningError};
use crate::config::{Frontend, PackageManager};
use crate::plan::PlannedOperation;

const REACT_DIRECTORIES: &[&str] = &[
    "src/components/common",
    "src/components/ui",
    "src/pages",
    "src/hooks",
    "src/utils",
    "src/services",
    "src/context",
    "src/assets/images",
    "src/assets/icons",
    "src/styles",
    "public/images",
];

/// App Router projects route through `src/app`, so there is no `pages`
const NEXT_DIRECTORIES: &[&str] = &[
    "src/components/common",
    "src/components/ui",
    "src/hooks",
    "src/utils",
    "src/services",
    "src/context",
    "src/assets/images",
    "src/assets/icons",
    "src/styles",
    "public/images",
];

const COMPONENT_DIRECTORIES: &[&str] = &["src/components/common", "src/components/ui"];

const COMMON_PACKAGES: &[&str] = &[
    "axios",
    "react-router-dom",
    "@tanstack/react-query",
    "zustand",
    "react-hook-form",
    "yup",
    "framer-motion",
    "@mui/material",
    "@emotion/react",
    "@emotion/styled",
];

/// React 19 (Next.js) needs the latest majors
const NEXT_CORE_PACKAGES: &[&str] = &[
    "axios",
    "@tanstack/react-query@latest",
    "zustand",
    "react-hook-form",
    "@hookform/resolvers",
    "yup",
    "framer-motion@latest",
];

/// MUI still declares React 18 peers
const NEXT_UI_PACKAGES: &[&str] = &[
    "@mui/material@latest",
    "@emotion/react@latest",
    "@emotion/styled@latest",
    "@mui/icons-material@latest",
];

const DEV_PACKAGES: &[&str] = &[
    "prettier",
    "eslint-config-prettier",
    "eslint-plugin-prettier",
    "@testing-library/react",
    "@testing-library/jest-dom",
    "@testing-library/user-event",
];

const TYPE_PACKAGES: &[&str] = &["@types/react", "@types/react-dom", "@types/node"];

/// Directories, component index files and `.gitkeep` placeholders
pub fn folder_structure(ctx: &GenerationContext<'_>) -> Vec<PlannedOperation> {
    let config = ctx.config;
    if config.frontend.is_none() || !config.folder_structure {
        return Vec::new();
    }

    let dir = &ctx.layout.frontend_dir;
    let directories = match config.frontend {
        Frontend::NextJs => NEXT_DIRECTORIES,
        _ => REACT_DIRECTORIES,
    };
    let index = format!("index.{}", config.language.module_ext());

    let mut ops: Vec<PlannedOperation> = directories
        .iter()
        .map(|d| PlannedOperation::create_dir(dir.join(d)))
        .collect();

    for d in directories {
        let file = if COMPONENT_DIRECTORIES.contains(d) {
            ctx.write(
                dir.join(d).join(&index),
                "// Export components from this directory\n",
            )
        } else {
            ctx.write(dir.join(d).join(".gitkeep"), "")
        };
        ops.push(file);
    }

    ops
}

/// Install commands for the common runtime and development packages.
/// Nothing is planned when installs are disabled.
pub fn common_packages(ctx: &GenerationContext<'_>) -> Result<Vec<PlannedOperation>, PlanningError> {
    let config = ctx.config;
    if config.frontend.is_none() || !config.common_packages || !config.install {
        return Ok(Vec::new());
    }

    let pm = ctx.js_package_manager(config.frontend.display_name())?;
    let dir = &ctx.layout.frontend_dir;
    let mut ops = Vec::new();

    let mut add = |packages: &[&str], dev: bool, legacy_peers: bool| {
        if let Some(mut argv) = pm.add(packages, dev) {
            if legacy_peers && pm == PackageManager::Npm {
                argv.push("--legacy-peer-deps".to_string());
            }
            ops.push(PlannedOperation::run(argv, dir));
        }
    };

    if config.frontend == Frontend::NextJs {
        add(NEXT_CORE_PACKAGES, false, false);
        add(NEXT_UI_PACKAGES, false, true);
    } else {
        add(COMMON_PACKAGES, false, false);
    }

    let mut dev: Vec<&str> = DEV_PACKAGES.to_vec();
    if config.language.is_typescript() {
        dev.extend_from_slice(TYPE_PACKAGES);
    }
    add(&dev, true, false);

    Ok(ops)
}
