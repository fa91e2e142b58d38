//! Settings file (`stackgen.yaml`) with default choices and limits

use super::project::{Backend, Frontend, PackageManager, ProjectConfig, ScriptLanguage, Styling};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit settings file
pub const SETTINGS_ENV: &str = "STACKGEN_CONFIG";

/// Settings file picked up from the working directory
pub const SETTINGS_FILE: &str = "stackgen.yaml";

/// Timeout applied to every external command when nothing else is configured
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Default choices; anything unset falls back to the built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    pub backend: Option<Backend>,
    pub frontend: Option<Frontend>,
    pub styling: Option<Styling>,
    pub package_manager: Option<PackageManager>,
    pub language: Option<ScriptLanguage>,
    pub docker: Option<bool>,
    pub folder_structure: Option<bool>,
    pub common_packages: Option<bool>,
    pub ml_workspace: Option<bool>,
    pub install: Option<bool>,
}

impl Defaults {
    /// Keep every choice set here, taking the rest from `fallback`
    pub fn or(self, fallback: &Defaults) -> Defaults {
        Defaults {
            backend: self.backend.or(fallback.backend),
            frontend: self.frontend.or(fallback.frontend),
            styling: self.styling.or(fallback.styling),
            package_manager: self.package_manager.or(fallback.package_manager),
            language: self.language.or(fallback.language),
            docker: self.docker.or(fallback.docker),
            folder_structure: self.folder_structure.or(fallback.folder_structure),
            common_packages: self.common_packages.or(fallback.common_packages),
            ml_workspace: self.ml_workspace.or(fallback.ml_workspace),
            install: self.install.or(fallback.install),
        }
    }

    /// Build a config, using built-in defaults for anything unset. Without
    /// an explicit package manager a frontend gets npm and a backend-only
    /// project gets pip.
    pub fn to_config(&self, name: impl Into<String>, parent_dir: impl Into<PathBuf>) -> ProjectConfig {
        let base = ProjectConfig::new(name, parent_dir);
        let frontend = self.frontend.unwrap_or(base.frontend);
        let package_manager = self.package_manager.unwrap_or(if frontend.is_none() {
            PackageManager::Pip
        } else {
            PackageManager::Npm
        });

        ProjectConfig {
            backend: self.backend.unwrap_or(base.backend),
            frontend,
            styling: self.styling.unwrap_or(base.styling),
            package_manager,
            language: self.language.unwrap_or(base.language),
            docker: self.docker.unwrap_or(base.docker),
            folder_structure: self.folder_structure.unwrap_or(base.folder_structure),
            common_packages: self.common_packages.unwrap_or(base.common_packages),
            ml_workspace: self.ml_workspace.unwrap_or(base.ml_workspace),
            install: self.install.unwrap_or(base.install),
            ..base
        }
    }
}

/// Contents of the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Default project choices
    pub defaults: Defaults,

    /// Upper bound for each external command, in seconds
    pub command_timeout_secs: Option<u64>,
}

impl Settings {
    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse settings")
    }

    /// Read settings from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    /// Locate and load settings.
    ///
    /// Lookup order: `explicit`, then `$STACKGEN_CONFIG`, then
    /// `stackgen.yaml` in `cwd`. An explicitly named file must exist; a
    /// missing working-directory file yields the defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        if let Ok(path) = std::env::var(SETTINGS_ENV) {
            if !path.is_empty() {
                let path = PathBuf::from(path);
                return Ok((Self::from_file(&path)?, Some(path)));
            }
        }

        let local = cwd.join(SETTINGS_FILE);
        if local.is_file() {
            return Ok((Self::from_file(&local)?, Some(local)));
        }

        Ok((Self::default(), None))
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_COMMAND_TIMEOUT)
    }
}
