//! kiln filesystem layer.
//!
//! Everything that touches the disk, an archive or a child process lives here so
//! the workflow crate can stay a thin sequencing layer.

pub mod ops;
pub mod path;
pub mod pattern;
pub mod walk;

pub use kiln_error::{ConfigError, ConfigResult, StepError, StepResult};
pub use ops::archive_ops::{extract_archive, zip_files, ZipOptions};
pub use ops::clean_ops::clean_dir;
pub use ops::copy_ops::{copy_files, CopyOptions};
pub use ops::delete_ops::delete_matching;
pub use ops::process_ops::{run_command, CommandSpec};
pub use ops::rename_ops::move_single_match;
pub use pattern::{translate, PatternFilter};
pub use walk::matching_files;
