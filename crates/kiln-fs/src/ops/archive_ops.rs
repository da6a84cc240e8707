//! Deflate zip creation and extraction.

use crate::path::{archive_name, ensure_dir, relative_to};
use kiln_error::{StepError, StepResult};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Options controlling how an archive is written.
#[derive(Debug, Clone)]
pub struct ZipOptions {
    /// Add to an existing archive instead of replacing it.
    pub append: bool,
    /// Create the archive's parent directory when it does not exist.
    pub create_dest: bool,
}

impl Default for ZipOptions {
    fn default() -> Self {
        Self {
            append: false,
            create_dest: true,
        }
    }
}

/// Write `files` into `archive`, storing each under its path relative to `base`.
///
/// The archive itself is skipped if it appears in `files`. Returns the number
/// of entries written.
pub fn zip_files(
    files: &[PathBuf],
    base: &Path,
    archive: &Path,
    opts: &ZipOptions,
) -> StepResult<usize> {
    if let Some(parent) = archive.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent, opts.create_dest)?;
    }
    let existing = fs::canonicalize(archive).ok();

    let mut writer = if opts.append && archive.is_file() {
        log::info!("Appending to archive {}", archive.display());
        let file = OpenOptions::new().read(true).write(true).open(archive)?;
        ZipWriter::new_append(file)?
    } else {
        log::info!("Creating archive {}", archive.display());
        ZipWriter::new(File::create(archive)?)
    };
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut written = 0;
    for file in files {
        if existing.is_some() && fs::canonicalize(file).ok() == existing {
            continue;
        }
        let name = archive_name(&relative_to(file, base)?);
        log::debug!("Adding {} as {}", file.display(), name);
        writer.start_file(name, options)?;
        let mut source = File::open(file)?;
        io::copy(&mut source, &mut writer)?;
        written += 1;
    }
    writer.finish()?;
    log::info!("Added {} files to {}", written, archive.display());
    Ok(written)
}

/// Unpack every entry of `archive` into `dest`. Returns the number of files written.
///
/// Entries whose names would escape `dest` are skipped.
pub fn extract_archive(archive: &Path, dest: &Path, create_dest: bool) -> StepResult<usize> {
    if !archive.is_file() {
        return Err(StepError::MissingFile(archive.to_path_buf()));
    }
    ensure_dir(dest, create_dest)?;

    let mut zip = ZipArchive::new(File::open(archive)?)?;
    let mut extracted = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let outpath = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                log::warn!("Skipping unsafe archive entry {}", entry.name());
                continue;
            }
        };

        if entry.is_dir() {
            log::debug!("Creating directory {}", outpath.display());
            fs::create_dir_all(&outpath)?;
            continue;
        }
        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }
        log::debug!("Extracting file {}", outpath.display());
        let mut outfile = File::create(&outpath)?;
        io::copy(&mut entry, &mut outfile)?;
        extracted += 1;
    }
    log::info!("Extracted {} files to {}", extracted, dest.display());
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry_names(archive: &Path) -> Vec<String> {
        let zip = ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn zip_then_extract_round_trips_contents_and_paths() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("pkg");
        fs::create_dir_all(src.join("data")).unwrap();
        fs::write(src.join("run.sh"), b"#!/bin/sh\necho hi\n").unwrap();
        fs::write(src.join("data/blob.bin"), [0u8, 1, 2, 255, 254]).unwrap();
        let files = vec![src.join("data/blob.bin"), src.join("run.sh")];
        let archive = dir.path().join("dist/pkg.zip");

        let written = zip_files(&files, &src, &archive, &ZipOptions::default()).unwrap();
        assert_eq!(written, 2);
        assert_eq!(entry_names(&archive), vec!["data/blob.bin", "run.sh"]);

        let out = dir.path().join("unpacked");
        let extracted = extract_archive(&archive, &out, true).unwrap();
        assert_eq!(extracted, 2);
        assert_eq!(
            fs::read(out.join("run.sh")).unwrap(),
            fs::read(src.join("run.sh")).unwrap()
        );
        assert_eq!(
            fs::read(out.join("data/blob.bin")).unwrap(),
            vec![0u8, 1, 2, 255, 254]
        );
    }

    #[test]
    fn append_keeps_existing_entries() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join("b.txt"), b"b").unwrap();
        let archive = dir.path().join("out/all.zip");

        zip_files(
            &[dir.path().join("a.txt")],
            dir.path(),
            &archive,
            &ZipOptions::default(),
        )
        .unwrap();
        zip_files(
            &[dir.path().join("b.txt")],
            dir.path(),
            &archive,
            &ZipOptions {
                append: true,
                create_dest: true,
            },
        )
        .unwrap();

        assert_eq!(entry_names(&archive), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn archive_is_not_added_to_itself() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        let archive = dir.path().join("self.zip");
        fs::write(&archive, b"stale").unwrap();

        let files = vec![dir.path().join("a.txt"), archive.clone()];
        let written = zip_files(&files, dir.path(), &archive, &ZipOptions::default()).unwrap();

        assert_eq!(written, 1);
        assert_eq!(entry_names(&archive), vec!["a.txt"]);
    }

    #[test]
    fn missing_archive_directory_without_create_is_fatal() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("missing/out.zip");
        let err = zip_files(
            &[],
            dir.path(),
            &archive,
            &ZipOptions {
                append: false,
                create_dest: false,
            },
        )
        .unwrap_err();
        assert!(matches!(err, StepError::MissingDestination(_)));
    }

    #[test]
    fn extract_requires_destination_when_not_creating() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        zip_files(&[], dir.path(), &archive, &ZipOptions::default()).unwrap();

        let err = extract_archive(&archive, &dir.path().join("absent"), false).unwrap_err();
        assert!(matches!(err, StepError::MissingDestination(_)));
    }

    #[test]
    fn extract_missing_archive_is_fatal() {
        let dir = tempdir().unwrap();
        let err = extract_archive(&dir.path().join("nope.zip"), dir.path(), true).unwrap_err();
        assert!(matches!(err, StepError::MissingFile(_)));
    }
}
