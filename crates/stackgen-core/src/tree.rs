//! Text rendering of a directory tree

use crate::archive::DEFAULT_EXCLUDES;
use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::Path;

const EXTRA_EXCLUDES: &[&str] = &[".venv"];

/// Render `root` as a `├──`/`└──` tree. Directories come before files,
/// both sorted case-insensitively; cache directories and `exclude` names
/// are skipped. Unreadable subdirectories and symlinks are shown without
/// children.
pub fn render_tree(root: &Path, exclude: &[String]) -> Result<String> {
    if !root.is_dir() {
        anyhow::bail!("Not a directory: {}", root.display());
    }

    let excludes: Vec<&str> = DEFAULT_EXCLUDES
        .iter()
        .chain(EXTRA_EXCLUDES)
        .copied()
        .chain(exclude.iter().map(String::as_str))
        .collect();

    let mut out = String::from(".\n");
    let entries = sorted_entries(root, &excludes)
        .with_context(|| format!("Failed to read {}", root.display()))?;
    render_entries(&entries, "", &excludes, &mut out);
    Ok(out)
}

struct Entry {
    name: String,
    path: std::path::PathBuf,
    is_dir: bool,
}

fn sorted_entries(dir: &Path, excludes: &[&str]) -> std::io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if excludes.contains(&name.as_str()) {
            continue;
        }
        // file_type does not follow symlinks, so a link back up cannot loop
        let is_dir = entry.file_type()?.is_dir();
        entries.push(Entry {
            is_dir,
            name,
            path: entry.path(),
        });
    }
    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    Ok(entries)
}

fn render_entries(entries: &[Entry], prefix: &str, excludes: &[&str], out: &mut String) {
    for (idx, entry) in entries.iter().enumerate() {
        let last = idx + 1 == entries.len();
        let connector = if last { "└── " } else { "├── " };
        let _ = writeln!(out, "{}{}{}", prefix, connector, entry.name);

        if entry.is_dir {
            let children = match sorted_entries(&entry.path, excludes) {
                Ok(children) => children,
                Err(e) => {
                    tracing::debug!(path = %entry.path.display(), error = %e, "skipping unreadable directory");
                    continue;
                }
            };
            let extension = if last { "    " } else { "│   " };
            render_entries(&children, &format!("{}{}", prefix, extension), excludes, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_directories_first_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::write(root.join("src/components/index.ts"), "").unwrap();
        fs::write(root.join("src/App.tsx"), "").unwrap();
        fs::create_dir_all(root.join("Docs")).unwrap();
        fs::write(root.join("b.txt"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();

        let tree = render_tree(root, &[]).unwrap();
        let expected = "\
.
├── Docs
├── src
│   ├── components
│   │   └── index.ts
│   └── App.tsx
├── b.txt
└── README.md
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_excluded_names_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("node_modules/react")).unwrap();
        fs::create_dir_all(root.join(".venv/bin")).unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join("main.py"), "").unwrap();

        let tree = render_tree(root, &["notes.txt".to_string()]).unwrap();
        assert_eq!(tree, ".\n└── main.py\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("app")).unwrap();
        fs::write(root.join("app/main.py"), "").unwrap();
        std::os::unix::fs::symlink(root, root.join("app/loop")).unwrap();

        let tree = render_tree(root, &[]).unwrap();
        assert_eq!(tree, ".\n└── app\n    ├── loop\n    └── main.py\n");
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(render_tree(&dir.path().join("missing"), &[]).is_err());
    }
}
