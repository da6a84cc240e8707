use kiln_error::{StepError, StepResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Path of `path` relative to `base`.
pub fn relative_to(path: &Path, base: &Path) -> StepResult<PathBuf> {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .map_err(|_| StepError::NotRelative {
            path: path.to_path_buf(),
            base: base.to_path_buf(),
        })
}

/// Archive entry name for a relative path, always `/`-separated.
pub fn archive_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Make sure `dir` exists, creating it when `create` is set.
pub fn ensure_dir(dir: &Path, create: bool) -> StepResult<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if !create {
        return Err(StepError::MissingDestination(dir.to_path_buf()));
    }
    log::info!("Creating destination directory: {}", dir.display());
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Resolve `path` and check it stays inside `root`. Both must exist.
pub fn ensure_within(root: &Path, path: &Path) -> StepResult<PathBuf> {
    let root = fs::canonicalize(root)?;
    let resolved = fs::canonicalize(path)?;
    if !resolved.starts_with(&root) {
        return Err(StepError::OutsideRoot {
            path: resolved,
            root,
        });
    }
    Ok(resolved)
}
