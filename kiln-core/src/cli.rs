//! CLI argument parsing for kiln
//!
//! Running without a subcommand builds the pipeline.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_LOG_FILE: &str = "logs/build.log";

#[derive(Debug, Parser)]
#[command(name = "kiln")]
#[command(version, about = "kiln - build and package client/server distributions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Working root: the source tree that build/ and logs/ live under
    #[arg(long, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Revision written to build/revision.txt (lower-cased)
    #[arg(long, default_value = "dirty", value_parser = parse_revision, global = true)]
    pub revision: String,

    /// Pipeline definition (TOML). Defaults to the built-in packaging pipeline
    #[arg(long, global = true)]
    pub pipeline: Option<PathBuf>,

    /// Log file (default: <root>/logs/build.log)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run every step in order (default)
    Build,

    /// Print the numbered step list without running anything
    Plan,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Build)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.root.join(DEFAULT_LOG_FILE))
    }
}

fn parse_revision(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("revision must not be empty".to_string());
    }
    Ok(value.to_lowercase())
}
