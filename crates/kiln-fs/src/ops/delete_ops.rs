use crate::path::ensure_within;
use crate::pattern::PatternFilter;
use kiln_error::{StepError, StepResult};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Delete every entry under `dir` whose base name matches `filter`.
///
/// `dir` must resolve inside `root`; otherwise nothing is deleted. Matching
/// directories are removed whole and not descended into. Returns the number of
/// entries removed.
pub fn delete_matching(
    root: &Path,
    dir: &Path,
    filter: &PatternFilter,
    recursive: bool,
) -> StepResult<usize> {
    if !dir.is_dir() {
        return Err(StepError::MissingDirectory(dir.to_path_buf()));
    }
    let dir = ensure_within(root, dir)?;

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut doomed = Vec::new();
    let mut it = WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = it.next() {
        let entry = entry?;
        if !filter.matches_name(entry.file_name()) {
            continue;
        }
        if entry.file_type().is_dir() {
            it.skip_current_dir();
        }
        doomed.push(entry.into_path());
    }

    for path in &doomed {
        log::info!("Deleting {}", path.display());
        if fs::symlink_metadata(path)?.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
    }
    Ok(doomed.len())
}
