//! Removal of build artifacts and caches from a project tree

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const PYTHON_DIRS: &[&str] = &[
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
    "dist",
    "build",
];
const PYTHON_DIR_SUFFIXES: &[&str] = &[".egg-info"];
const PYTHON_FILE_SUFFIXES: &[&str] = &[".pyc", ".pyo"];

const NODE_DIRS: &[&str] = &[
    "node_modules",
    ".next",
    "dist",
    "build",
    ".cache",
    ".parcel-cache",
    ".nuxt",
    ".output",
    ".vite",
    "coverage",
];

/// Which ecosystems to clean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanScope {
    Python,
    Node,
    #[default]
    All,
}

impl CleanScope {
    fn python(self) -> bool {
        matches!(self, CleanScope::Python | CleanScope::All)
    }

    fn node(self) -> bool {
        matches!(self, CleanScope::Node | CleanScope::All)
    }

    fn matches_dir(self, name: &str) -> bool {
        (self.python()
            && (PYTHON_DIRS.contains(&name)
                || PYTHON_DIR_SUFFIXES.iter().any(|s| name.ends_with(s))))
            || (self.node() && NODE_DIRS.contains(&name))
    }

    fn matches_file(self, name: &str) -> bool {
        self.python() && PYTHON_FILE_SUFFIXES.iter().any(|s| name.ends_with(s))
    }
}

/// One removed (or, in a dry run, removable) path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedEntry {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Result of a clean
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    pub removed: Vec<CleanedEntry>,
    pub failed: Vec<(PathBuf, String)>,
    pub dry_run: bool,
}

impl CleanReport {
    pub fn bytes_freed(&self) -> u64 {
        self.removed.iter().map(|e| e.bytes).sum()
    }
}

/// Paths under `root` that `scope` would remove. Matched directories are
/// not descended into; `root` itself is never a target.
pub fn find_targets(root: &Path, scope: CleanScope) -> Result<Vec<PathBuf>> {
    let mut targets = Vec::new();
    let mut walker = WalkDir::new(root).min_depth(1).into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        let name = entry.file_name().to_string_lossy();

        if entry.file_type().is_dir() {
            if scope.matches_dir(&name) {
                targets.push(entry.path().to_path_buf());
                walker.skip_current_dir();
            }
        } else if scope.matches_file(&name) {
            targets.push(entry.path().to_path_buf());
        }
    }

    Ok(targets)
}

/// Remove everything `scope` matches under `root`. Failures to remove one
/// path are recorded and the rest are still attempted.
pub fn clean(root: &Path, scope: CleanScope, dry_run: bool) -> Result<CleanReport> {
    if !root.is_dir() {
        anyhow::bail!("Not a directory: {}", root.display());
    }

    let mut report = CleanReport {
        dry_run,
        ..Default::default()
    };

    for path in find_targets(root, scope)? {
        let bytes = size_of(&path);
        if !dry_run {
            let result = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            if let Err(e) = result {
                tracing::warn!(path = %path.display(), error = %e, "could not remove");
                report.failed.push((path, e.to_string()));
                continue;
            }
        }
        tracing::debug!(path = %path.display(), bytes, dry_run, "cleaned");
        report.removed.push(CleanedEntry { path, bytes });
    }

    Ok(report)
}

/// Total size of the files under `path` (or of `path` itself)
pub fn size_of(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.2} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}
