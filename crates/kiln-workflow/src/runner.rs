use crate::event::{EventSink, LogSink, Phase, StepEvent};
use crate::step::{Outcome, StepStatus};
use crate::step_list::StepList;
use kiln_error::StepError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// Every step ran.
    Completed,
    /// A stop-on-failure step failed.
    Halted,
    /// A step raised a fatal error.
    Aborted,
}

/// The step that aborted a run and why.
#[derive(Debug)]
pub struct Abort {
    pub step: String,
    pub error: StepError,
}

#[derive(Debug)]
pub struct RunResult {
    pub state: RunState,
    pub attempted: usize,
    pub failures: usize,
    pub halted: bool,
    pub abort: Option<Abort>,
    /// Every step of the list with its final outcome, in order.
    pub outcomes: Vec<(String, Outcome)>,
}

impl RunResult {
    pub fn succeeded(&self) -> bool {
        !self.halted && self.abort.is_none()
    }

    /// Process exit status: nonzero on a halting failure or an abort.
    pub fn exit_code(&self) -> u8 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }
}

/// Executes a [`StepList`] once, front to back.
pub struct Runner<S = LogSink> {
    sink: S,
    state: RunState,
}

impl Runner<LogSink> {
    pub fn new() -> Self {
        Self::with_sink(LogSink)
    }
}

impl Default for Runner<LogSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> Runner<S> {
    pub fn with_sink(sink: S) -> Self {
        Self {
            sink,
            state: RunState::Idle,
        }
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("runner: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    pub fn run(mut self, mut steps: StepList) -> RunResult {
        self.transition(RunState::Running);
        log::info!("Root directory: {}", steps.root().display());

        let mut attempted = 0;
        let mut failures = 0;
        let mut abort = None;

        for (index, step) in steps.iter_mut().enumerate() {
            self.sink.emit(&StepEvent {
                index,
                step: step.name().to_string(),
                phase: Phase::Started,
                outcome: Outcome::NotRun,
                message: None,
            });
            attempted += 1;

            match step.execute() {
                StepStatus::Ok => {
                    self.sink.emit(&StepEvent {
                        index,
                        step: step.name().to_string(),
                        phase: Phase::Finished,
                        outcome: step.outcome(),
                        message: None,
                    });
                }
                StepStatus::Failed(_) => {
                    failures += 1;
                    self.sink.emit(&StepEvent {
                        index,
                        step: step.name().to_string(),
                        phase: Phase::Finished,
                        outcome: step.outcome(),
                        message: None,
                    });
                    if step.stop_on_failure() {
                        self.transition(RunState::Halted);
                        break;
                    }
                }
                StepStatus::Fatal(error) => {
                    failures += 1;
                    self.sink.emit(&StepEvent {
                        index,
                        step: step.name().to_string(),
                        phase: Phase::Aborted,
                        outcome: step.outcome(),
                        message: Some(error.to_string()),
                    });
                    abort = Some(Abort {
                        step: step.name().to_string(),
                        error,
                    });
                    self.transition(RunState::Aborted);
                    break;
                }
            }
        }

        if self.state == RunState::Running {
            self.transition(RunState::Completed);
        }

        let result = RunResult {
            state: self.state,
            attempted,
            failures,
            halted: self.state == RunState::Halted,
            abort,
            outcomes: steps
                .iter()
                .map(|s| (s.name().to_string(), s.outcome()))
                .collect(),
        };
        let status = if result.succeeded() {
            "succeeded"
        } else {
            "failed"
        };
        log::info!("Build {} with {} errors.", status, result.failures);
        result
    }
}
