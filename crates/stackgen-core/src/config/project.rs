//! Project configuration: the resolved set of user choices driving generation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Backend framework choice
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    #[default]
    None,
    #[serde(rename = "fastapi")]
    #[value(name = "fastapi")]
    FastApi,
}

impl Backend {
    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::None => "None",
            Backend::FastApi => "FastAPI",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Backend::None)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Frontend framework choice
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Frontend {
    #[default]
    None,
    Vite,
    Cra,
    #[serde(rename = "nextjs")]
    #[value(name = "nextjs")]
    NextJs,
}

impl Frontend {
    pub fn display_name(&self) -> &'static str {
        match self {
            Frontend::None => "None",
            Frontend::Vite => "Vite React",
            Frontend::Cra => "Create React App",
            Frontend::NextJs => "Next.js",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Frontend::None)
    }

    /// Styling options this frontend can be paired with
    pub fn allowed_styling(&self) -> &'static [Styling] {
        match self {
            Frontend::None => &[Styling::None],
            Frontend::Vite | Frontend::Cra => &[
                Styling::None,
                Styling::Tailwind,
                Styling::StyledComponents,
                Styling::Emotion,
            ],
            Frontend::NextJs => &[
                Styling::None,
                Styling::Tailwind,
                Styling::StyledComponents,
                Styling::CssModules,
            ],
        }
    }

    pub fn supports_styling(&self, styling: Styling) -> bool {
        self.allowed_styling().contains(&styling)
    }

    /// Command that starts the development server
    pub fn dev_command(&self, pm: PackageManager) -> String {
        match self {
            Frontend::Cra => format!("{} start", pm.binary()),
            _ => pm.run_script("dev"),
        }
    }

    /// Default development server port
    pub fn dev_port(&self) -> u16 {
        match self {
            Frontend::Vite => 5173,
            _ => 3000,
        }
    }
}

impl fmt::Display for Frontend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Styling choice applied on top of the base frontend
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Styling {
    #[default]
    None,
    Tailwind,
    StyledComponents,
    Emotion,
    CssModules,
}

impl Styling {
    pub fn display_name(&self) -> &'static str {
        match self {
            Styling::None => "Plain CSS",
            Styling::Tailwind => "Tailwind CSS",
            Styling::StyledComponents => "styled-components",
            Styling::Emotion => "Emotion",
            Styling::CssModules => "CSS Modules",
        }
    }
}

impl fmt::Display for Styling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Package manager used for installs
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
    Uv,
    Pip,
}

impl PackageManager {
    /// Executable name
    pub fn binary(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Uv => "uv",
            PackageManager::Pip => "pip",
        }
    }

    /// Whether this manager installs JavaScript packages
    pub fn is_javascript(&self) -> bool {
        matches!(
            self,
            PackageManager::Npm | PackageManager::Yarn | PackageManager::Pnpm
        )
    }

    pub fn is_python(&self) -> bool {
        !self.is_javascript()
    }

    /// argv for installing everything listed in the manifest
    pub fn install_all(&self) -> Vec<String> {
        vec![self.binary().to_string(), "install".to_string()]
    }

    /// argv for adding packages; `None` for Python managers
    pub fn add(&self, packages: &[&str], dev: bool) -> Option<Vec<String>> {
        let mut argv: Vec<String> = match self {
            PackageManager::Npm => vec!["npm".into(), "install".into()],
            PackageManager::Yarn => vec!["yarn".into(), "add".into()],
            PackageManager::Pnpm => vec!["pnpm".into(), "add".into()],
            PackageManager::Uv | PackageManager::Pip => return None,
        };
        if dev {
            argv.push("-D".into());
        }
        argv.extend(packages.iter().map(|p| p.to_string()));
        Some(argv)
    }

    /// Shell form of running a package.json script
    pub fn run_script(&self, script: &str) -> String {
        match self {
            PackageManager::Npm => format!("npm run {}", script),
            other => format!("{} {}", other.binary(), script),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binary())
    }
}

/// Frontend source language
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ScriptLanguage {
    #[value(name = "javascript", alias = "js")]
    JavaScript,
    #[default]
    #[value(name = "typescript", alias = "ts")]
    TypeScript,
}

impl ScriptLanguage {
    pub fn display_name(&self) -> &'static str {
        match self {
            ScriptLanguage::JavaScript => "JavaScript",
            ScriptLanguage::TypeScript => "TypeScript",
        }
    }

    pub fn is_typescript(&self) -> bool {
        matches!(self, ScriptLanguage::TypeScript)
    }

    /// Extension for component files (`jsx` / `tsx`)
    pub fn jsx_ext(&self) -> &'static str {
        match self {
            ScriptLanguage::JavaScript => "jsx",
            ScriptLanguage::TypeScript => "tsx",
        }
    }

    /// Extension for plain modules (`js` / `ts`)
    pub fn module_ext(&self) -> &'static str {
        match self {
            ScriptLanguage::JavaScript => "js",
            ScriptLanguage::TypeScript => "ts",
        }
    }
}

impl fmt::Display for ScriptLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Fully-resolved description of the project to generate.
///
/// Built once per invocation (from flags, the settings file and prompts)
/// and never mutated afterwards. The project root is `parent_dir/name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub parent_dir: PathBuf,
    pub backend: Backend,
    pub frontend: Frontend,
    pub styling: Styling,
    pub package_manager: PackageManager,
    pub language: ScriptLanguage,
    /// Allow generating into an existing non-empty directory, replacing
    /// files the plan writes
    pub overwrite: bool,
    pub docker: bool,
    pub folder_structure: bool,
    pub common_packages: bool,
    /// Add the ML workspace (data, models, notebooks, training scripts) to
    /// the backend
    pub ml_workspace: bool,
    /// Run package-manager install commands
    pub install: bool,
}

impl ProjectConfig {
    /// Config with the given name and parent directory and default choices
    pub fn new(name: impl Into<String>, parent_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            parent_dir: parent_dir.into(),
            backend: Backend::None,
            frontend: Frontend::None,
            styling: Styling::None,
            package_manager: PackageManager::Npm,
            language: ScriptLanguage::TypeScript,
            overwrite: false,
            docker: false,
            folder_structure: true,
            common_packages: false,
            ml_workspace: false,
            install: true,
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_frontend(mut self, frontend: Frontend) -> Self {
        self.frontend = frontend;
        self
    }

    pub fn with_styling(mut self, styling: Styling) -> Self {
        self.styling = styling;
        self
    }

    pub fn with_package_manager(mut self, pm: PackageManager) -> Self {
        self.package_manager = pm;
        self
    }

    pub fn with_language(mut self, language: ScriptLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_docker(mut self, docker: bool) -> Self {
        self.docker = docker;
        self
    }

    pub fn with_folder_structure(mut self, enabled: bool) -> Self {
        self.folder_structure = enabled;
        self
    }

    pub fn with_common_packages(mut self, enabled: bool) -> Self {
        self.common_packages = enabled;
        self
    }

    pub fn with_ml_workspace(mut self, enabled: bool) -> Self {
        self.ml_workspace = enabled;
        self
    }

    pub fn with_install(mut self, install: bool) -> Self {
        self.install = install;
        self
    }

    /// Directory the project is generated into
    pub fn project_root(&self) -> PathBuf {
        self.parent_dir.join(&self.name)
    }

    pub fn is_full_stack(&self) -> bool {
        !self.backend.is_none() && !self.frontend.is_none()
    }

    /// Human-readable project kind
    pub fn kind(&self) -> &'static str {
        match (self.backend.is_none(), self.frontend.is_none()) {
            (false, false) => "Full-Stack",
            (false, true) => "Backend",
            (true, false) => "Frontend",
            (true, true) => "Empty",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_root_joins_parent_and_name() {
        let config = ProjectConfig::new("demo", "/tmp/work");
        assert_eq!(config.project_root(), PathBuf::from("/tmp/work/demo"));
    }

    #[test]
    fn test_css_modules_is_nextjs_only() {
        assert!(Frontend::NextJs.supports_styling(Styling::CssModules));
        assert!(!Frontend::Vite.supports_styling(Styling::CssModules));
        assert!(!Frontend::Cra.supports_styling(Styling::CssModules));
        assert!(!Frontend::NextJs.supports_styling(Styling::Emotion));
    }

    #[test]
    fn test_no_frontend_only_allows_plain_styling() {
        assert_eq!(Frontend::None.allowed_styling(), &[Styling::None]);
    }

    #[test]
    fn test_package_manager_add_commands() {
        assert_eq!(
            PackageManager::Npm.add(&["axios"], false),
            Some(vec!["npm".to_string(), "install".into(), "axios".into()])
        );
        assert_eq!(
            PackageManager::Pnpm.add(&["tailwindcss"], true),
            Some(vec![
                "pnpm".to_string(),
                "add".into(),
                "-D".into(),
                "tailwindcss".into()
            ])
        );
        assert_eq!(PackageManager::Uv.add(&["fastapi"], false), None);
    }

    #[test]
    fn test_dev_command_per_framework() {
        assert_eq!(Frontend::Cra.dev_command(PackageManager::Npm), "npm start");
        assert_eq!(Frontend::Vite.dev_command(PackageManager::Npm), "npm run dev");
        assert_eq!(Frontend::NextJs.dev_command(PackageManager::Yarn), "yarn dev");
    }

    #[test]
    fn test_choice_names_round_trip_through_yaml() {
        let parsed: Frontend = serde_yaml::from_str("nextjs").unwrap();
        assert_eq!(parsed, Frontend::NextJs);
        let parsed: Backend = serde_yaml::from_str("fastapi").unwrap();
        assert_eq!(parsed, Backend::FastApi);
        let parsed: Styling = serde_yaml::from_str("styled-components").unwrap();
        assert_eq!(parsed, Styling::StyledComponents);
    }
}
