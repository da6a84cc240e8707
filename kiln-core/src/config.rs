//! TOML pipeline definitions.
//!
//! A pipeline file is a list of `[[steps]]` tables, each tagged with a `kind`:
//!
//! ```toml
//! [[steps]]
//! name = "Clean build directory"
//! kind = "clean"
//! dir = "build"
//!
//! [[steps]]
//! kind = "copy"
//! source = "client"
//! pattern = { wildcard = "*.*" }
//! dest = "build/client"
//! ```
//!
//! Relative paths resolve against the working root. Every pattern is compiled
//! while the list is built, so a bad filter fails before any step runs.

use crate::package::revision_step;
use anyhow::{bail, Context, Result};
use kiln_error::ConfigResult;
use kiln_fs::{CommandSpec, PatternFilter};
use kiln_workflow::{
    CleanSpec, CopySpec, DeleteSpec, ExtractSpec, RenameSpec, StepKind, StepList, ZipSpec,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Values injected into a pipeline at load time.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub root: PathBuf,
    pub revision: String,
}

impl PipelineContext {
    pub fn new(root: impl Into<PathBuf>, revision: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            revision: revision.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PipelineFile {
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Deserialize)]
pub struct StepConfig {
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub stop_on_failure: bool,
    #[serde(flatten)]
    pub kind: KindConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternConfig {
    Wildcard(String),
    Regex(String),
}

impl Default for PatternConfig {
    fn default() -> Self {
        PatternConfig::Wildcard("*".to_string())
    }
}

impl PatternConfig {
    pub fn compile(&self) -> ConfigResult<PatternFilter> {
        match self {
            PatternConfig::Wildcard(glob) => PatternFilter::wildcard(glob),
            PatternConfig::Regex(expr) => PatternFilter::regex(expr),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindConfig {
    Clean {
        dir: PathBuf,
    },
    Copy {
        /// Directory to match files in. Ignored when `files` is given.
        source: Option<PathBuf>,
        #[serde(default)]
        files: Vec<PathBuf>,
        /// Base for explicit `files`; defaults to the working root.
        root: Option<PathBuf>,
        #[serde(default)]
        pattern: PatternConfig,
        #[serde(default = "default_true")]
        recursive: bool,
        dest: PathBuf,
        #[serde(default = "default_true")]
        create_dest: bool,
    },
    Delete {
        dir: PathBuf,
        pattern: PatternConfig,
        #[serde(default)]
        recursive: bool,
    },
    Rename {
        dir: PathBuf,
        pattern: PatternConfig,
        #[serde(default = "default_true")]
        recursive: bool,
        dest: PathBuf,
    },
    Extract {
        archive: PathBuf,
        dest: PathBuf,
        #[serde(default = "default_true")]
        create_dest: bool,
    },
    Zip {
        source: PathBuf,
        archive: PathBuf,
        #[serde(default)]
        pattern: PatternConfig,
        #[serde(default = "default_true")]
        recursive: bool,
        relative_to: Option<PathBuf>,
        #[serde(default)]
        append: bool,
        #[serde(default = "default_true")]
        create_dest: bool,
    },
    Command {
        program: Option<String>,
        #[serde(default)]
        args: Vec<String>,
        /// Shell line, run through `sh -c`. Takes precedence over `program`.
        shell: Option<String>,
        cwd: Option<PathBuf>,
        timeout_secs: Option<u64>,
    },
    Revision {
        #[serde(default = "default_revision_path")]
        path: PathBuf,
    },
}

fn default_true() -> bool {
    true
}

fn default_revision_path() -> PathBuf {
    PathBuf::from("build/revision.txt")
}

pub fn load_pipeline(path: &Path, ctx: &PipelineContext) -> Result<StepList> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read pipeline {}", path.display()))?;
    parse_pipeline(&text, ctx).with_context(|| format!("invalid pipeline {}", path.display()))
}

pub fn parse_pipeline(text: &str, ctx: &PipelineContext) -> Result<StepList> {
    let file: PipelineFile = toml::from_str(text).context("failed to parse pipeline TOML")?;
    let mut list = StepList::new(&ctx.root);
    for (idx, step) in file.steps.into_iter().enumerate() {
        let kind = build_kind(step.kind, &list, ctx)
            .with_context(|| format!("step #{}", idx + 1))?;
        list.push(step.name.as_deref(), kind, step.stop_on_failure)?;
    }
    Ok(list)
}

fn build_kind(config: KindConfig, list: &StepList, ctx: &PipelineContext) -> Result<StepKind> {
    let kind = match config {
        KindConfig::Clean { dir } => StepKind::Clean(CleanSpec::new(list.resolve(dir))),
        KindConfig::Copy {
            source,
            files,
            root,
            pattern,
            recursive,
            dest,
            create_dest,
        } => {
            let spec = if !files.is_empty() {
                let root = root.map_or_else(|| list.root().to_path_buf(), |r| list.resolve(r));
                let files = files.into_iter().map(|f| list.resolve(f)).collect();
                CopySpec::files(root, files, list.resolve(dest))
            } else if let Some(source) = source {
                CopySpec::matching(
                    list.resolve(source),
                    pattern.compile()?,
                    recursive,
                    list.resolve(dest),
                )
            } else {
                bail!("copy step needs either `files` or `source`");
            };
            StepKind::CopyFiles(spec.create_dest(create_dest))
        }
        KindConfig::Delete {
            dir,
            pattern,
            recursive,
        } => StepKind::DeleteFiles(DeleteSpec::new(
            list.root(),
            list.resolve(dir),
            pattern.compile()?,
            recursive,
        )),
        KindConfig::Rename {
            dir,
            pattern,
            recursive,
            dest,
        } => StepKind::RenameFile(RenameSpec::new(
            list.resolve(dir),
            pattern.compile()?,
            recursive,
            list.resolve(dest),
        )),
        KindConfig::Extract {
            archive,
            dest,
            create_dest,
        } => StepKind::ExtractFiles(
            ExtractSpec::new(list.resolve(archive), list.resolve(dest)).create_dest(create_dest),
        ),
        KindConfig::Zip {
            source,
            archive,
            pattern,
            recursive,
            relative_to,
            append,
            create_dest,
        } => {
            let mut spec = ZipSpec::new(list.resolve(source), list.resolve(archive))
                .filter(pattern.compile()?, recursive)
                .append(append)
                .create_dest(create_dest);
            if let Some(base) = relative_to {
                spec = spec.relative_to(list.resolve(base));
            }
            StepKind::ZipFiles(spec)
        }
        KindConfig::Command {
            program,
            args,
            shell,
            cwd,
            timeout_secs,
        } => {
            let mut spec = match (shell, program) {
                (Some(line), _) => CommandSpec::shell(line),
                (None, Some(program)) => CommandSpec::new(program).args(args),
                (None, None) => bail!("command step needs either `shell` or `program`"),
            };
            let cwd = cwd.map_or_else(|| list.root().to_path_buf(), |d| list.resolve(d));
            spec = spec.current_dir(cwd);
            if let Some(secs) = timeout_secs {
                spec = spec.timeout(Duration::from_secs(secs));
            }
            StepKind::Command(spec)
        }
        KindConfig::Revision { path } => revision_step(list.resolve(path), &ctx.revision),
    };
    Ok(kind)
}
