//! The closed set of build step behaviours.

use crate::step::StepStatus;
use kiln_error::StepResult;
use kiln_fs::{
    clean_dir, copy_files, delete_matching, extract_archive, matching_files, move_single_match,
    run_command, zip_files, CommandSpec, CopyOptions, PatternFilter, ZipOptions,
};
use std::fmt;
use std::path::PathBuf;

pub type Callback = Box<dyn FnMut() -> StepStatus>;

pub enum StepKind {
    Clean(CleanSpec),
    CopyFiles(CopySpec),
    DeleteFiles(DeleteSpec),
    RenameFile(RenameSpec),
    ExtractFiles(ExtractSpec),
    ZipFiles(ZipSpec),
    Command(CommandSpec),
    Generic(Callback),
}

impl StepKind {
    pub(crate) fn execute(&mut self) -> StepStatus {
        match self {
            StepKind::Clean(spec) => spec.run().into(),
            StepKind::CopyFiles(spec) => spec.run().into(),
            StepKind::DeleteFiles(spec) => spec.run().into(),
            StepKind::RenameFile(spec) => spec.run().into(),
            StepKind::ExtractFiles(spec) => spec.run().into(),
            StepKind::ZipFiles(spec) => spec.run().into(),
            StepKind::Command(spec) => match run_command(spec) {
                Ok(status) if status.success() => StepStatus::Ok,
                Ok(status) => StepStatus::Failed(status.code()),
                Err(err) => StepStatus::Fatal(err),
            },
            StepKind::Generic(callback) => callback(),
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Clean(spec) => write!(f, "clean {}", spec.dir.display()),
            StepKind::CopyFiles(spec) => match &spec.source {
                CopySource::Files { files, .. } => write!(
                    f,
                    "copy {} file(s) -> {}",
                    files.len(),
                    spec.dest.display()
                ),
                CopySource::Matching { dir, filter, .. } => write!(
                    f,
                    "copy {}/{} -> {}",
                    dir.display(),
                    filter,
                    spec.dest.display()
                ),
            },
            StepKind::DeleteFiles(spec) => {
                write!(f, "delete {}/{}", spec.dir.display(), spec.filter)
            }
            StepKind::RenameFile(spec) => write!(
                f,
                "move {}/{} -> {}",
                spec.dir.display(),
                spec.filter,
                spec.dest.display()
            ),
            StepKind::ExtractFiles(spec) => write!(
                f,
                "extract {} -> {}",
                spec.archive.display(),
                spec.dest.display()
            ),
            StepKind::ZipFiles(spec) => write!(
                f,
                "zip {}/{} -> {}",
                spec.source.display(),
                spec.filter,
                spec.archive.display()
            ),
            StepKind::Command(spec) => write!(f, "run `{}`", spec),
            StepKind::Generic(_) => write!(f, "callback"),
        }
    }
}

impl fmt::Debug for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Clean(spec) => f.debug_tuple("Clean").field(spec).finish(),
            StepKind::CopyFiles(spec) => f.debug_tuple("CopyFiles").field(spec).finish(),
            StepKind::DeleteFiles(spec) => f.debug_tuple("DeleteFiles").field(spec).finish(),
            StepKind::RenameFile(spec) => f.debug_tuple("RenameFile").field(spec).finish(),
            StepKind::ExtractFiles(spec) => f.debug_tuple("ExtractFiles").field(spec).finish(),
            StepKind::ZipFiles(spec) => f.debug_tuple("ZipFiles").field(spec).finish(),
            StepKind::Command(spec) => f.debug_tuple("Command").field(spec).finish(),
            StepKind::Generic(_) => f.write_str("Generic(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanSpec {
    pub dir: PathBuf,
}

impl CleanSpec {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn run(&self) -> StepResult<()> {
        clean_dir(&self.dir)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum CopySource {
    /// Explicit files, placed relative to `root`.
    Files { root: PathBuf, files: Vec<PathBuf> },
    /// Files under `dir` whose names match, resolved when the step runs.
    Matching {
        dir: PathBuf,
        filter: PatternFilter,
        recursive: bool,
    },
}

#[derive(Debug, Clone)]
pub struct CopySpec {
    pub source: CopySource,
    pub dest: PathBuf,
    pub create_dest: bool,
}

impl CopySpec {
    pub fn files(root: impl Into<PathBuf>, files: Vec<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: CopySource::Files {
                root: root.into(),
                files,
            },
            dest: dest.into(),
            create_dest: true,
        }
    }

    pub fn matching(
        dir: impl Into<PathBuf>,
        filter: PatternFilter,
        recursive: bool,
        dest: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: CopySource::Matching {
                dir: dir.into(),
                filter,
                recursive,
            },
            dest: dest.into(),
            create_dest: true,
        }
    }

    pub fn create_dest(mut self, create: bool) -> Self {
        self.create_dest = create;
        self
    }

    fn run(&self) -> StepResult<()> {
        let opts = CopyOptions {
            create_dest: self.create_dest,
        };
        match &self.source {
            CopySource::Files { root, files } => copy_files(files, root, &self.dest, &opts)?,
            CopySource::Matching {
                dir,
                filter,
                recursive,
            } => {
                let files = matching_files(dir, filter, *recursive)?;
                copy_files(&files, dir, &self.dest, &opts)?
            }
        };
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DeleteSpec {
    /// Working root; `dir` must resolve inside it.
    pub root: PathBuf,
    pub dir: PathBuf,
    pub filter: PatternFilter,
    pub recursive: bool,
}

impl DeleteSpec {
    pub fn new(
        root: impl Into<PathBuf>,
        dir: impl Into<PathBuf>,
        filter: PatternFilter,
        recursive: bool,
    ) -> Self {
        Self {
            root: root.into(),
            dir: dir.into(),
            filter,
            recursive,
        }
    }

    fn run(&self) -> StepResult<()> {
        let removed = delete_matching(&self.root, &self.dir, &self.filter, self.recursive)?;
        log::info!("Deleted {} entries", removed);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RenameSpec {
    pub dir: PathBuf,
    pub filter: PatternFilter,
    pub recursive: bool,
    pub dest: PathBuf,
}

impl RenameSpec {
    pub fn new(
        dir: impl Into<PathBuf>,
        filter: PatternFilter,
        recursive: bool,
        dest: impl Into<PathBuf>,
    ) -> Self {
        Self {
            dir: dir.into(),
            filter,
            recursive,
            dest: dest.into(),
        }
    }

    fn run(&self) -> StepResult<()> {
        move_single_match(&self.dir, &self.filter, self.recursive, &self.dest)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ExtractSpec {
    pub archive: PathBuf,
    pub dest: PathBuf,
    pub create_dest: bool,
}

impl ExtractSpec {
    pub fn new(archive: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            dest: dest.into(),
            create_dest: true,
        }
    }

    pub fn create_dest(mut self, create: bool) -> Self {
        self.create_dest = create;
        self
    }

    fn run(&self) -> StepResult<()> {
        extract_archive(&self.archive, &self.dest, self.create_dest)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ZipSpec {
    pub source: PathBuf,
    pub filter: PatternFilter,
    pub recursive: bool,
    pub archive: PathBuf,
    /// Stored names are relative to this; defaults to `source`.
    pub relative_to: Option<PathBuf>,
    pub append: bool,
    pub create_dest: bool,
}

impl ZipSpec {
    pub fn new(source: impl Into<PathBuf>, archive: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            filter: PatternFilter::any(),
            recursive: true,
            archive: archive.into(),
            relative_to: None,
            append: false,
            create_dest: true,
        }
    }

    pub fn filter(mut self, filter: PatternFilter, recursive: bool) -> Self {
        self.filter = filter;
        self.recursive = recursive;
        self
    }

    pub fn relative_to(mut self, base: impl Into<PathBuf>) -> Self {
        self.relative_to = Some(base.into());
        self
    }

    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn create_dest(mut self, create: bool) -> Self {
        self.create_dest = create;
        self
    }

    fn run(&self) -> StepResult<()> {
        let files = matching_files(&self.source, &self.filter, self.recursive)?;
        let base = self.relative_to.as_ref().unwrap_or(&self.source);
        let opts = ZipOptions {
            append: self.append,
            create_dest: self.create_dest,
        };
        zip_files(&files, base, &self.archive, &opts)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_fs::translate;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn run(kind: &mut StepKind) -> StepStatus {
        kind.execute()
    }

    #[test]
    fn copy_matching_recreates_tree() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a");
        fs::create_dir_all(src.join("b")).unwrap();
        fs::write(src.join("x.txt"), b"x").unwrap();
        fs::write(src.join("b/y.txt"), b"y").unwrap();
        let out = dir.path().join("out");

        let mut kind = StepKind::CopyFiles(CopySpec::matching(
            &src,
            PatternFilter::any(),
            true,
            &out,
        ));
        assert!(matches!(run(&mut kind), StepStatus::Ok));

        let mut copied = kiln_fs::matching_files(&out, &PatternFilter::any(), true).unwrap();
        copied.sort();
        assert_eq!(copied, vec![out.join("b/y.txt"), out.join("x.txt")]);
        assert_eq!(fs::read(out.join("x.txt")).unwrap(), b"x");
        assert_eq!(fs::read(out.join("b/y.txt")).unwrap(), b"y");
    }

    #[test]
    fn copy_without_create_dest_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("x.txt"), b"x").unwrap();
        let mut kind = StepKind::CopyFiles(
            CopySpec::files(
                dir.path(),
                vec![dir.path().join("x.txt")],
                dir.path().join("missing"),
            )
            .create_dest(false),
        );
        assert!(matches!(run(&mut kind), StepStatus::Fatal(_)));
    }

    #[test]
    fn zip_rebases_stored_names() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("build/client");
        fs::create_dir_all(pkg.join("data")).unwrap();
        fs::write(pkg.join("data/a.dat"), b"a").unwrap();
        fs::write(pkg.join("data/skip.log"), b"l").unwrap();
        let archive = dir.path().join("build/client.zip");

        let mut kind = StepKind::ZipFiles(
            ZipSpec::new(pkg.join("data"), &archive)
                .filter(translate("*.dat").unwrap(), true)
                .relative_to(dir.path().join("build")),
        );
        assert!(matches!(run(&mut kind), StepStatus::Ok));

        let zip = zip::ZipArchive::new(fs::File::open(&archive).unwrap()).unwrap();
        let names: Vec<&str> = zip.file_names().collect();
        assert_eq!(names, vec!["client/data/a.dat"]);
    }

    #[test]
    fn zip_missing_source_is_fatal() {
        let dir = tempdir().unwrap();
        let mut kind = StepKind::ZipFiles(ZipSpec::new(
            dir.path().join("nope"),
            dir.path().join("out.zip"),
        ));
        assert!(matches!(run(&mut kind), StepStatus::Fatal(_)));
        assert!(!dir.path().join("out.zip").exists());
    }

    #[cfg(unix)]
    #[test]
    fn command_exit_code_becomes_failure() {
        let mut kind = StepKind::Command(CommandSpec::shell("exit 4"));
        assert!(matches!(run(&mut kind), StepStatus::Failed(Some(4))));

        let mut kind = StepKind::Command(CommandSpec::shell("true"));
        assert!(matches!(run(&mut kind), StepStatus::Ok));
    }

    #[test]
    fn display_describes_the_action() {
        let kind = StepKind::RenameFile(RenameSpec::new(
            "dist",
            translate("*.exe").unwrap(),
            true,
            "out/game.exe",
        ));
        let expected = format!(
            "move {}/*.exe -> {}",
            Path::new("dist").display(),
            Path::new("out/game.exe").display()
        );
        assert_eq!(kind.to_string(), expected);
        assert_eq!(
            format!("{:?}", StepKind::Generic(Box::new(|| StepStatus::Ok))),
            "Generic(..)"
        );
    }
}
