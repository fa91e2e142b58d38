//! Zipping a project directory, optionally cleaning it first

use crate::clean::{clean, CleanReport, CleanScope};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::{DirEntry, WalkDir};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Directory names never archived
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "__pycache__",
    "node_modules",
    ".next",
    ".git",
    ".vscode",
    ".idea",
    "dist",
    "build",
    ".cache",
];

pub const DEFAULT_LEVEL: u8 = 6;

/// Archive settings
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Destination; defaults to `<name>_<unix-secs>.zip` in the working
    /// directory
    pub output: Option<PathBuf>,
    /// Run the cache cleaner over the source first
    pub clean_first: bool,
    /// Deflate level, 0 (store) to 9
    pub level: u8,
    /// Extra file or directory names to leave out
    pub exclude: Vec<String>,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            output: None,
            clean_first: false,
            level: DEFAULT_LEVEL,
            exclude: Vec::new(),
        }
    }
}

impl ArchiveOptions {
    /// Set the compression level, clamped to 0-9
    pub fn with_level(mut self, level: i64) -> Self {
        self.level = clamp_level(level);
        self
    }
}

/// What was archived
#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub output: PathBuf,
    pub files: usize,
    pub archive_bytes: u64,
    pub cleaned: Option<CleanReport>,
}

pub fn clamp_level(level: i64) -> u8 {
    level.clamp(0, 9) as u8
}

/// `<dir-name>_<unix-secs>.zip`
pub fn default_output_name(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}_{}.zip", name, secs)
}

/// Zip `source` with entries relative to its parent, so the archive
/// unpacks into a single directory named after the source.
pub fn archive(source: &Path, options: &ArchiveOptions) -> Result<ArchiveReport> {
    let source = source
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", source.display()))?;
    if !source.is_dir() {
        anyhow::bail!("Not a directory: {}", source.display());
    }
    let base = source.parent().unwrap_or(&source).to_path_buf();

    let cleaned = if options.clean_first {
        Some(clean(&source, CleanScope::All, false)?)
    } else {
        None
    };

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_output_name(&source)));
    let file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    // the archive may live inside the tree it archives
    let output_abs = output.canonicalize().unwrap_or_else(|_| output.clone());

    let file_options = file_options(options.level);
    let excludes: Vec<&str> = DEFAULT_EXCLUDES
        .iter()
        .copied()
        .chain(options.exclude.iter().map(String::as_str))
        .collect();

    let mut zip = ZipWriter::new(BufWriter::new(file));
    let mut files = 0;

    let walker = WalkDir::new(&source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e, &excludes));

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
        let path = entry.path();
        if path == output_abs {
            continue;
        }

        let name = entry_name(path, &base)?;
        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), file_options)
                .with_context(|| format!("Failed to add directory {}", name))?;
        } else if entry.file_type().is_file() {
            zip.start_file(name.clone(), file_options)
                .with_context(|| format!("Failed to add {}", name))?;
            let mut input = File::open(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            std::io::copy(&mut input, &mut zip)
                .with_context(|| format!("Failed to compress {}", path.display()))?;
            files += 1;
            if files % 100 == 0 {
                tracing::info!(files, "compressing");
            }
        }
    }

    let mut writer = zip.finish().context("Failed to finalize archive")?;
    writer.flush().context("Failed to flush archive")?;
    drop(writer);

    let archive_bytes = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
    Ok(ArchiveReport {
        output,
        files,
        archive_bytes,
        cleaned,
    })
}

fn file_options(level: u8) -> SimpleFileOptions {
    let level = clamp_level(i64::from(level));
    if level == 0 {
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
    } else {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(level)))
    }
}

fn is_excluded(entry: &DirEntry, excludes: &[&str]) -> bool {
    let name = entry.file_name().to_string_lossy();
    excludes.iter().any(|e| *e == name)
}

/// Forward-slash path of `path` relative to `base`
fn entry_name(path: &Path, base: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(base)
        .with_context(|| format!("{} is outside {}", path.display(), base.display()))?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}
