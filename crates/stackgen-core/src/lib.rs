//! Stackgen Core - Planning and generation of full-stack project skeletons
//!
//! Given a [`ProjectConfig`] (backend, frontend, styling, package manager),
//! this library validates the choices, expands them into an ordered
//! [`Plan`] of directory creations, file writes and external commands, and
//! applies the plan through an [`Executor`].
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Pure planning** - [`validate`], [`plan`] and the framework
//!   [`generators`]; none of these touch the disk
//! - **Layer 2: Side effects** - the [`exec`] executor, [`runtime`] tool
//!   detection, and the [`clean`], [`archive`] and [`tree`] utilities
//! - **Layer 3: Workflow** - the [`orchestrator`], plus optional
//!   cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use stackgen_core::{scaffold, Executor, Frontend, ProjectConfig, Styling};
//!
//! let config = ProjectConfig::new("demo", ".")
//!     .with_frontend(Frontend::Vite)
//!     .with_styling(Styling::Tailwind);
//!
//! let result = scaffold(&config, &Executor::system()).await?;
//! assert!(result.is_success());
//! ```

pub mod archive;
pub mod clean;
pub mod config;
pub mod exec;
pub mod generators;
pub mod logging;
pub mod orchestrator;
pub mod plan;
pub mod runtime;
pub mod tree;
pub mod validate;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{
    Backend, Defaults, Frontend, PackageManager, ProjectConfig, ScriptLanguage, Settings, Styling,
};
pub use exec::{CancelFlag, CommandRunner, ExecutionError, ExecutionResult, Executor, SystemRunner};
pub use generators::{FrameworkGenerator, PlanningError};
pub use orchestrator::{next_steps, prepare, scaffold, scaffold_with, ScaffoldError};
pub use plan::{Plan, PlanFormat, PlannedOperation};
pub use validate::{validate, ValidationError};

#[cfg(feature = "tui")]
pub use tui::run;
