//! Structured step events, routed by the caller to whatever sinks it wants.

use crate::step::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Started,
    Finished,
    /// The step raised a fatal error; the run stops here.
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEvent {
    pub index: usize,
    pub step: String,
    pub phase: Phase,
    pub outcome: Outcome,
    pub message: Option<String>,
}

pub trait EventSink {
    fn emit(&mut self, event: &StepEvent);
}

impl EventSink for Vec<StepEvent> {
    fn emit(&mut self, event: &StepEvent) {
        self.push(event.clone());
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &StepEvent) {
        (**self).emit(event);
    }
}

impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &StepEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

/// Writes events through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: &StepEvent) {
        match (event.phase, event.outcome) {
            (Phase::Started, _) => log::info!("Executing build step: {}", event.step),
            (Phase::Finished, Outcome::Failure { code }) => match code {
                Some(code) => log::error!(
                    "Build step {} failed with error code: {}",
                    event.step,
                    code
                ),
                None => log::error!("Build step {} failed", event.step),
            },
            (Phase::Finished, _) => log::info!("Build step succeeded: {}", event.step),
            (Phase::Aborted, _) => log::error!(
                "Error occurred during build step: {}: {}",
                event.step,
                event.message.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(phase: Phase) -> StepEvent {
        StepEvent {
            index: 0,
            step: "Clean".to_string(),
            phase,
            outcome: Outcome::NotRun,
            message: None,
        }
    }

    #[test]
    fn pair_sink_forwards_to_both() {
        let mut first = Vec::new();
        let mut second = Vec::new();
        {
            let mut sink = (&mut first, &mut second);
            sink.emit(&event(Phase::Started));
            sink.emit(&event(Phase::Finished));
        }
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }
}
