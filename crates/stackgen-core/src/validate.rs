//! Configuration validation, run before anything touches the disk

use crate::config::{Frontend, PackageManager, ProjectConfig, Styling};
use crate::generators::{FrameworkGenerator, Generate};
use crate::plan::Layout;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// npm refuses package names longer than this
const MAX_NAME_LEN: usize = 214;

/// Device names Windows will not accept as a file or directory name
const RESERVED_NAMES: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Why a configuration cannot be generated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("project name cannot be empty")]
    EmptyName,

    #[error("invalid project name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("nothing to generate: choose a backend, a frontend, or both")]
    NothingToGenerate,

    #[error("{styling} is not available for {frontend} (choose one of: {allowed})")]
    UnsupportedStyling {
        frontend: Frontend,
        styling: Styling,
        allowed: String,
    },

    #[error("package manager '{package_manager}' cannot be used here: {reason}")]
    UnsupportedPackageManager {
        package_manager: PackageManager,
        reason: &'static str,
    },

    #[error("parent directory does not exist: {}", .0.display())]
    ParentMissing(PathBuf),

    #[error("path exists and is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("path exists and is not empty: {} (pass --overwrite to generate into it)", .0.display())]
    PathExists(PathBuf),

    #[error("{framework} must create {} itself, but it already has files in it", .path.display())]
    ScaffolderTargetNotEmpty {
        framework: &'static str,
        path: PathBuf,
    },
}

/// Check a configuration for legality.
///
/// Only reads the filesystem (existence of the parent and target
/// directories); never creates or changes anything.
pub fn validate(config: &ProjectConfig) -> Result<(), ValidationError> {
    validate_name(&config.name, !config.frontend.is_none())?;
    validate_selection(config)?;
    validate_target(config)?;
    Ok(())
}

/// Check a project name. `npm_rules` adds npm package naming constraints.
pub fn validate_name(name: &str, npm_rules: bool) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let invalid = |reason| ValidationError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.len() > MAX_NAME_LEN {
        return Err(invalid("must be at most 214 characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid(
            "can only contain letters, numbers, hyphens, and underscores",
        ));
    }
    if name.starts_with(['-', '_', '.']) {
        return Err(invalid("must start with a letter or number"));
    }
    if RESERVED_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
        return Err(invalid("is a reserved device name"));
    }
    if npm_rules && name.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(invalid("must be lowercase for JavaScript projects"));
    }

    Ok(())
}

fn validate_selection(config: &ProjectConfig) -> Result<(), ValidationError> {
    if config.backend.is_none() && config.frontend.is_none() {
        return Err(ValidationError::NothingToGenerate);
    }

    if !config.frontend.supports_styling(config.styling) {
        let allowed = config
            .frontend
            .allowed_styling()
            .iter()
            .map(|s| s.display_name())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ValidationError::UnsupportedStyling {
            frontend: config.frontend,
            styling: config.styling,
            allowed,
        });
    }

    let pm = config.package_manager;
    let unsupported = |reason| ValidationError::UnsupportedPackageManager {
        package_manager: pm,
        reason,
    };

    if !config.frontend.is_none() && !pm.is_javascript() {
        return Err(unsupported("a frontend needs npm, yarn, or pnpm"));
    }
    if config.frontend.is_none() && !pm.is_python() {
        return Err(unsupported("a backend-only project needs uv or pip"));
    }
    if config.frontend == Frontend::Cra && pm == PackageManager::Pnpm {
        return Err(unsupported("Create React App supports npm and yarn only"));
    }

    Ok(())
}

fn validate_target(config: &ProjectConfig) -> Result<(), ValidationError> {
    let parent = &config.parent_dir;
    if !parent.as_os_str().is_empty() && !parent.is_dir() {
        return Err(ValidationError::ParentMissing(parent.clone()));
    }

    let root = config.project_root();
    if !root.exists() {
        return Ok(());
    }
    if !root.is_dir() {
        return Err(ValidationError::NotADirectory(root));
    }

    if has_entries(&root) && !config.overwrite {
        return Err(ValidationError::PathExists(root));
    }

    // create-react-app and create-next-app refuse a directory with files in
    // it, overwrite or not
    if let Some(generator) = FrameworkGenerator::for_frontend(config.frontend) {
        let frontend_dir = Layout::for_config(config).frontend_dir;
        if generator.delegates() && frontend_dir.is_dir() && has_entries(&frontend_dir) {
            return Err(ValidationError::ScaffolderTargetNotEmpty {
                framework: generator.name(),
                path: frontend_dir,
            });
        }
    }

    Ok(())
}

fn has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(true)
}
