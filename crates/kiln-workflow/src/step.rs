use crate::variants::StepKind;
use kiln_error::{StepError, StepResult};
use std::fmt;

/// What a single execution reports back to the runner.
#[derive(Debug)]
pub enum StepStatus {
    Ok,
    /// Recoverable failure, e.g. a command exiting nonzero. `None` when killed by a signal.
    Failed(Option<i32>),
    /// A precondition could not be met; the run aborts.
    Fatal(StepError),
}

impl From<StepResult<()>> for StepStatus {
    fn from(result: StepResult<()>) -> Self {
        match result {
            Ok(()) => StepStatus::Ok,
            Err(err) => StepStatus::Fatal(err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NotRun,
    Success,
    Failure { code: Option<i32> },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NotRun => write!(f, "not run"),
            Outcome::Success => write!(f, "success"),
            Outcome::Failure { code: Some(code) } => write!(f, "failure (exit={})", code),
            Outcome::Failure { code: None } => write!(f, "failure"),
        }
    }
}

pub struct Step {
    name: String,
    kind: StepKind,
    stop_on_failure: bool,
    outcome: Outcome,
}

impl Step {
    pub(crate) fn new(name: String, kind: StepKind, stop_on_failure: bool) -> Self {
        Self {
            name,
            kind,
            stop_on_failure,
            outcome: Outcome::NotRun,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn stop_on_failure(&self) -> bool {
        self.stop_on_failure
    }

    /// Run the step once. The outcome is recorded whichever way it ends;
    /// a second call is fatal and leaves the first outcome in place.
    pub fn execute(&mut self) -> StepStatus {
        if self.outcome != Outcome::NotRun {
            return StepStatus::Fatal(StepError::AlreadyExecuted(self.name.clone()));
        }
        let status = self.kind.execute();
        self.outcome = match &status {
            StepStatus::Ok => Outcome::Success,
            StepStatus::Failed(code) => Outcome::Failure { code: *code },
            StepStatus::Fatal(_) => Outcome::Failure { code: None },
        };
        status
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("stop_on_failure", &self.stop_on_failure)
            .field("outcome", &self.outcome)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::CleanSpec;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn outcome_is_recorded_on_success() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("junk"), b"j").unwrap();
        let mut step = Step::new(
            "clean".to_string(),
            StepKind::Clean(CleanSpec::new(dir.path())),
            true,
        );

        assert_eq!(step.outcome(), Outcome::NotRun);
        assert!(matches!(step.execute(), StepStatus::Ok));
        assert_eq!(step.outcome(), Outcome::Success);
    }

    #[test]
    fn outcome_is_recorded_on_fatal_error() {
        let dir = tempdir().unwrap();
        let mut step = Step::new(
            "clean".to_string(),
            StepKind::Clean(CleanSpec::new(dir.path().join("missing"))),
            false,
        );

        assert!(matches!(step.execute(), StepStatus::Fatal(_)));
        assert_eq!(step.outcome(), Outcome::Failure { code: None });
    }

    #[test]
    fn second_execution_is_rejected() {
        let mut step = Step::new(
            "noop".to_string(),
            StepKind::Generic(Box::new(|| StepStatus::Failed(Some(2)))),
            true,
        );

        assert!(matches!(step.execute(), StepStatus::Failed(Some(2))));
        let again = step.execute();
        assert!(matches!(again, StepStatus::Fatal(StepError::AlreadyExecuted(_))));
        assert_eq!(step.outcome(), Outcome::Failure { code: Some(2) });
    }

    #[test]
    fn outcome_display() {
        assert_eq!(Outcome::Failure { code: Some(1) }.to_string(), "failure (exit=1)");
        assert_eq!(Outcome::NotRun.to_string(), "not run");
    }
}
