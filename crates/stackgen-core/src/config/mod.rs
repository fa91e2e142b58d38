//! Project configuration types and the settings file
//!
//! This module provides:
//! - `ProjectConfig` and the choice enums it is built from
//! - `Settings`, the optional YAML file supplying default choices

pub mod project;
pub mod settings;

pub use project::{Backend, Frontend, PackageManager, ProjectConfig, ScriptLanguage, Styling};
pub use settings::{Defaults, Settings, DEFAULT_COMMAND_TIMEOUT, SETTINGS_ENV, SETTINGS_FILE};
