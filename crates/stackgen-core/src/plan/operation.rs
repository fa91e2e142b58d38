//! Planned filesystem and process operations

use colored::Colorize;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One action the executor applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlannedOperation {
    /// Create a directory (and any missing ancestors); existing is fine
    CreateDirectory { path: PathBuf },

    /// Write `contents` to `path`. The parent must already exist and an
    /// existing target is only replaced when `overwrite` is set.
    WriteFile {
        path: PathBuf,
        contents: String,
        overwrite: bool,
    },

    /// Run an external program; exit code 0 is success
    RunCommand { argv: Vec<String>, cwd: PathBuf },
}

impl PlannedOperation {
    pub fn create_dir(path: impl Into<PathBuf>) -> Self {
        Self::CreateDirectory { path: path.into() }
    }

    pub fn write_file(path: impl Into<PathBuf>, contents: impl Into<String>, overwrite: bool) -> Self {
        Self::WriteFile {
            path: path.into(),
            contents: contents.into(),
            overwrite,
        }
    }

    pub fn run<I, S>(argv: I, cwd: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RunCommand {
            argv: argv.into_iter().map(Into::into).collect(),
            cwd: cwd.into(),
        }
    }

    /// Path created or written; `None` for commands
    pub fn target(&self) -> Option<&Path> {
        match self {
            Self::CreateDirectory { path } | Self::WriteFile { path, .. } => Some(path),
            Self::RunCommand { .. } => None,
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Self::RunCommand { .. })
    }

    /// Short verb used in listings
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateDirectory { .. } => "create",
            Self::WriteFile { .. } => "write",
            Self::RunCommand { .. } => "run",
        }
    }
}

impl fmt::Display for PlannedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDirectory { path } => write!(f, "create  {}/", path.display()),
            Self::WriteFile {
                path,
                contents,
                overwrite,
            } => {
                write!(f, "write   {} ({} bytes)", path.display(), contents.len())?;
                if *overwrite {
                    write!(f, " [overwrite]")?;
                }
                Ok(())
            }
            Self::RunCommand { argv, cwd } => {
                write!(f, "run     {} (in {})", argv.join(" "), cwd.display())
            }
        }
    }
}

/// Output format for dry runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PlanFormat {
    #[default]
    Text,
    Yaml,
}

/// Ordered list of operations derived from one configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Plan {
    operations: Vec<PlannedOperation>,
}

impl Plan {
    pub fn new(operations: Vec<PlannedOperation>) -> Self {
        Self { operations }
    }

    pub fn operations(&self) -> &[PlannedOperation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<PlannedOperation> {
        self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlannedOperation> {
        self.operations.iter()
    }

    /// argv of every command, in order
    pub fn commands(&self) -> Vec<&[String]> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                PlannedOperation::RunCommand { argv, .. } => Some(argv.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// (directories, files, commands)
    pub fn counts(&self) -> (usize, usize, usize) {
        self.operations
            .iter()
            .fold((0, 0, 0), |(d, w, r), op| match op {
                PlannedOperation::CreateDirectory { .. } => (d + 1, w, r),
                PlannedOperation::WriteFile { .. } => (d, w + 1, r),
                PlannedOperation::RunCommand { .. } => (d, w, r + 1),
            })
    }

    /// Numbered, colored listing for dry runs
    pub fn render(&self) -> String {
        let width = self.operations.len().to_string().len();
        let mut out = String::new();
        for (i, op) in self.operations.iter().enumerate() {
            let line = match op {
                PlannedOperation::CreateDirectory { .. } => op.to_string().blue().to_string(),
                PlannedOperation::WriteFile { .. } => op.to_string().normal().to_string(),
                PlannedOperation::RunCommand { .. } => op.to_string().yellow().to_string(),
            };
            out.push_str(&format!("{:>width$}. {}\n", i + 1, line, width = width));
        }
        out
    }

    /// YAML form for machine consumption
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn format(&self, format: PlanFormat) -> anyhow::Result<String> {
        match format {
            PlanFormat::Text => Ok(self.render()),
            PlanFormat::Yaml => self.to_yaml(),
        }
    }
}

impl IntoIterator for Plan {
    type Item = PlannedOperation;
    type IntoIter = std::vec::IntoIter<PlannedOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a PlannedOperation;
    type IntoIter = std::slice::Iter<'a, PlannedOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
