//! File copies that keep each file's path relative to a source root.

use crate::path::{ensure_dir, relative_to};
use kiln_error::StepResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Options controlling how files are copied.
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Create the destination directory when it does not exist.
    pub create_dest: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self { create_dest: true }
    }
}

/// Copy `files` into `dest`, each placed at its path relative to `root`.
///
/// Intermediate directories are created as needed. Returns the number of files copied.
pub fn copy_files(
    files: &[PathBuf],
    root: &Path,
    dest: &Path,
    opts: &CopyOptions,
) -> StepResult<usize> {
    ensure_dir(dest, opts.create_dest)?;

    let mut copied = 0;
    for file in files {
        let target = dest.join(relative_to(file, root)?);
        log::info!("Copying {} to {}", file.display(), target.display());
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(file, &target)?;
        copied += 1;
    }
    log::info!("Copied {} files", copied);
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_error::StepError;
    use tempfile::tempdir;

    #[test]
    fn preserves_relative_layout() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a");
        fs::create_dir_all(src.join("b")).unwrap();
        fs::write(src.join("x.txt"), b"x").unwrap();
        fs::write(src.join("b/y.txt"), b"y").unwrap();
        let out = dir.path().join("out");

        let files = vec![src.join("x.txt"), src.join("b/y.txt")];
        let copied = copy_files(&files, &src, &out, &CopyOptions::default()).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read(out.join("x.txt")).unwrap(), b"x");
        assert_eq!(fs::read(out.join("b/y.txt")).unwrap(), b"y");
    }

    #[test]
    fn missing_destination_without_create_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("x.txt"), b"x").unwrap();
        let out = dir.path().join("out");

        let err = copy_files(
            &[dir.path().join("x.txt")],
            dir.path(),
            &out,
            &CopyOptions { create_dest: false },
        )
        .unwrap_err();

        assert!(matches!(err, StepError::MissingDestination(_)));
        assert!(!out.exists());
    }

    #[test]
    fn file_outside_root_is_rejected() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(&root).unwrap();
        fs::write(dir.path().join("stray.txt"), b"s").unwrap();

        let err = copy_files(
            &[dir.path().join("stray.txt")],
            &root,
            &dir.path().join("out"),
            &CopyOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, StepError::NotRelative { .. }));
    }
}
