//! Built-in client/server packaging pipeline.
//!
//! Layout under the working root:
//!
//! - `client/`, `server/`: package sources, copied recursively
//! - `bin/`, `mods/`: shared files, copied into both packages
//! - `build/`: output; `build/<package>/` plus `build/<package>.zip`

use anyhow::Result;
use kiln_error::{StepError, StepResult};
use kiln_fs::{matching_files, translate};
use kiln_workflow::{CleanSpec, CopySpec, StepKind, StepList, StepStatus, ZipSpec};
use std::fs;
use std::path::{Path, PathBuf};

pub const BUILD_DIR: &str = "build";
pub const REVISION_FILENAME: &str = "revision.txt";
pub const PACKAGES: [&str; 2] = ["client", "server"];
pub const SHARED_DIRS: [&str; 2] = ["bin", "mods"];

pub fn write_revision_file(path: &Path, revision: &str) -> StepResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    log::info!("Writing revision {} to {}", revision, path.display());
    fs::write(path, revision)?;
    Ok(())
}

/// Callback step that creates `dir` (and its parents) if missing.
pub fn create_dir_step(dir: PathBuf) -> StepKind {
    StepKind::Generic(Box::new(move || {
        StepStatus::from(fs::create_dir_all(&dir).map_err(StepError::from))
    }))
}

/// Callback step that writes `revision` to `path`.
pub fn revision_step(path: PathBuf, revision: &str) -> StepKind {
    let revision = revision.to_string();
    StepKind::Generic(Box::new(move || {
        StepStatus::from(write_revision_file(&path, &revision))
    }))
}

pub fn package_pipeline(ctx: &crate::PipelineContext) -> Result<StepList> {
    let mut list = StepList::new(&ctx.root);
    let root = list.root().to_path_buf();
    let build_dir = list.resolve(BUILD_DIR);

    let revision_path = build_dir.join(REVISION_FILENAME);
    list.add("Create build directory", create_dir_step(build_dir.clone()))?;
    list.add(
        "Clean build directory",
        StepKind::Clean(CleanSpec::new(&build_dir)),
    )?;
    list.add(
        "Create revision file",
        revision_step(revision_path.clone(), &ctx.revision),
    )?;

    // Shared files are collected now, as they exist before the build starts.
    let any_with_ext = translate("*.*")?;
    let mut shared = Vec::new();
    for dir in SHARED_DIRS {
        let path = list.resolve(dir);
        if path.is_dir() {
            let files = matching_files(&path, &any_with_ext, false)?;
            shared.push((dir, files));
        } else {
            log::warn!("Skipping {}: directory not found", path.display());
        }
    }

    for package in PACKAGES {
        let package_dir = build_dir.join(package);
        list.add(
            &format!("Copy revision file to {}", package),
            StepKind::CopyFiles(CopySpec::files(
                &build_dir,
                vec![revision_path.clone()],
                &package_dir,
            )),
        )?;

        let source = list.resolve(package);
        if source.is_dir() {
            list.add(
                &format!("Copy {}", package),
                StepKind::CopyFiles(CopySpec::matching(
                    source,
                    any_with_ext.clone(),
                    true,
                    &package_dir,
                )),
            )?;
        } else {
            log::warn!("Skipping {}: directory not found", source.display());
        }

        for (dir, files) in &shared {
            list.add(
                &format!("Copy {}/ to {}", dir, package),
                StepKind::CopyFiles(CopySpec::files(
                    &root,
                    files.clone(),
                    &package_dir,
                )),
            )?;
        }

        list.add(
            &format!("Zip {}", package),
            StepKind::ZipFiles(ZipSpec::new(
                &package_dir,
                build_dir.join(format!("{}.zip", package)),
            )),
        )?;
    }
    Ok(list)
}
