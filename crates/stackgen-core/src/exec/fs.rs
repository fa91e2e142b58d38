//! Directory creation and atomic file writes

use super::ExecutionError;
use std::path::{Path, PathBuf};

/// Create `path` and any missing ancestors; an existing directory is fine
pub async fn create_dir(path: &Path) -> Result<(), ExecutionError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| ExecutionError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Write `contents` to `path` through a temporary sibling and a rename, so
/// a reader never sees a half-written file.
pub async fn write_file(path: &Path, contents: &str, overwrite: bool) -> Result<(), ExecutionError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let parent_is_dir = tokio::fs::metadata(parent)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !parent_is_dir {
        return Err(ExecutionError::MissingParent(path.to_path_buf()));
    }

    if !overwrite && tokio::fs::symlink_metadata(path).await.is_ok() {
        return Err(ExecutionError::AlreadyExists(path.to_path_buf()));
    }

    let tmp = temp_sibling(path, parent);
    let io_err = |source| ExecutionError::Io {
        path: path.to_path_buf(),
        source,
    };

    tokio::fs::write(&tmp, contents).await.map_err(io_err)?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_err(e));
    }
    Ok(())
}

fn temp_sibling(path: &Path, parent: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    parent.join(format!(".{}.tmp-{}", name, std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b");
        create_dir(&target).await.unwrap();
        create_dir(&target).await.unwrap();
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn test_write_requires_parent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing/file.txt");
        assert!(matches!(
            write_file(&target, "x", false).await,
            Err(ExecutionError::MissingParent(_))
        ));
        assert!(!dir.path().join("missing").exists());
    }

    #[tokio::test]
    async fn test_existing_target_needs_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("file.txt");
        std::fs::write(&target, "old").unwrap();

        assert!(matches!(
            write_file(&target, "new", false).await,
            Err(ExecutionError::AlreadyExists(_))
        ));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "old");

        write_file(&target, "new", true).await.unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("a.txt"), "hello", false)
            .await
            .unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("a.txt")]);
    }
}
