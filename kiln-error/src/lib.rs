use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type StepResult<T> = Result<T, StepError>;
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fatal step errors. Any of these aborts the whole run.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("Directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("File does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Destination does not exist: {}", .0.display())]
    MissingDestination(PathBuf),

    #[error("No file matching '{pattern}' found in {}", dir.display())]
    NotFound { dir: PathBuf, pattern: String },

    #[error("Pattern '{pattern}' matched {} files in {}, expected one", candidates.len(), dir.display())]
    AmbiguousMatch {
        dir: PathBuf,
        pattern: String,
        candidates: Vec<PathBuf>,
    },

    #[error("Refusing to delete {}: outside working root {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("{} is not located under {}", path.display(), base.display())]
    NotRelative { path: PathBuf, base: PathBuf },

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Command timed out: {program} after {timeout:?}")]
    CommandTimeout { program: String, timeout: Duration },

    #[error("Step already executed: {0}")]
    AlreadyExecuted(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Traversal error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while assembling a step list, before anything runs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Duplicate step name: {0}")]
    DuplicateName(String),
}
