use crate::pattern::PatternFilter;
use crate::walk::matching_files;
use kiln_error::{StepError, StepResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Find the one file under `dir` matching `filter` and move it to `dest`.
///
/// Zero matches and more than one match are both fatal; in either case nothing
/// is moved. Returns the path that was moved.
pub fn move_single_match(
    dir: &Path,
    filter: &PatternFilter,
    recursive: bool,
    dest: &Path,
) -> StepResult<PathBuf> {
    let mut candidates = matching_files(dir, filter, recursive)?;
    let source = match candidates.len() {
        0 => {
            return Err(StepError::NotFound {
                dir: dir.to_path_buf(),
                pattern: filter.source().to_string(),
            })
        }
        1 => candidates.remove(0),
        _ => {
            return Err(StepError::AmbiguousMatch {
                dir: dir.to_path_buf(),
                pattern: filter.source().to_string(),
                candidates,
            })
        }
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    log::info!("Moving {} to {}", source.display(), dest.display());
    if let Err(err) = fs::rename(&source, dest) {
        // rename(2) cannot cross filesystems; fall back to copy + unlink.
        log::debug!("rename failed ({}), copying instead", err);
        fs::copy(&source, dest)?;
        fs::remove_file(&source)?;
    }
    Ok(source)
}
