use crate::pattern::PatternFilter;
use kiln_error::{StepError, StepResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regular files under `dir` whose base name matches `filter`, in file-name order.
///
/// Symlinks are not followed and are never returned.
pub fn matching_files(
    dir: &Path,
    filter: &PatternFilter,
    recursive: bool,
) -> StepResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(StepError::MissingDirectory(dir.to_path_buf()));
    }
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() && filter.matches_name(entry.file_name()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::translate;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn non_recursive_walk_stays_at_top_level() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.txt"));
        touch(&dir.path().join("sub/b.txt"));

        let filter = translate("*.txt").unwrap();
        let flat = matching_files(dir.path(), &filter, false).unwrap();
        assert_eq!(flat, vec![dir.path().join("a.txt")]);

        let deep = matching_files(dir.path(), &filter, true).unwrap();
        assert_eq!(
            deep,
            vec![dir.path().join("a.txt"), dir.path().join("sub/b.txt")]
        );
    }

    #[test]
    fn directories_are_not_returned() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs.txt")).unwrap();
        let files = matching_files(dir.path(), &PatternFilter::any(), true).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempdir().unwrap();
        let err = matching_files(&dir.path().join("nope"), &PatternFilter::any(), true)
            .unwrap_err();
        assert!(matches!(err, StepError::MissingDirectory(_)));
    }
}
