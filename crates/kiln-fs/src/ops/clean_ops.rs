use kiln_error::{StepError, StepResult};
use std::fs;
use std::path::Path;

/// Remove every immediate entry of `dir`, leaving the directory itself in place.
///
/// Symlinks are unlinked, never followed. Returns the number of entries removed.
pub fn clean_dir(dir: &Path) -> StepResult<usize> {
    if !dir.is_dir() {
        return Err(StepError::MissingDirectory(dir.to_path_buf()));
    }
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        log::info!("Deleting {}", path.display());
        let meta = fs::symlink_metadata(&path)?;
        if meta.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        removed += 1;
    }
    Ok(removed)
}
