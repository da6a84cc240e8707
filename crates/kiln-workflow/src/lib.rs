//! kiln workflow execution.
//!
//! A [`StepList`] is assembled up front by the caller; a [`Runner`] then walks it
//! once, in order, and reports a [`RunResult`]. Step behaviour lives in
//! [`StepKind`], a closed set of variants backed by `kiln-fs`.

pub mod event;
pub mod runner;
pub mod step;
pub mod step_list;
pub mod variants;

pub use event::{EventSink, LogSink, Phase, StepEvent};
pub use runner::{Abort, RunResult, RunState, Runner};
pub use step::{Outcome, Step, StepStatus};
pub use step_list::StepList;
pub use variants::{
    Callback, CleanSpec, CopySource, CopySpec, DeleteSpec, ExtractSpec, RenameSpec, StepKind,
    ZipSpec,
};
