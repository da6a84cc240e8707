//! Concrete operations behind each build step.

pub mod archive_ops;
pub mod clean_ops;
pub mod copy_ops;
pub mod delete_ops;
pub mod process_ops;
pub mod rename_ops;
