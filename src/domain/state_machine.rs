use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Start,
    Registered,
    ParityResolved,
    QuerySelected,
    Persisted,
    Submitted,
    Done,
    Aborted,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Aborted)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    RegistrationSucceeded,
    ParityResolved,
    QuerySelected,
    SolutionPersisted,
    /// 提交不論成敗都會推進狀態
    SubmissionAttempted { succeeded: bool },
    Finished,
    StepFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: RunState,
    pub event: String,
    pub reason: String,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot apply {} in state {}: {}", self.event, self.from, self.reason)
    }
}

impl std::error::Error for TransitionError {}

pub fn transition(current: RunState, event: &RunEvent) -> Result<RunState, TransitionError> {
    match (current, event) {
        (RunState::Start, RunEvent::RegistrationSucceeded) => Ok(RunState::Registered),
        (RunState::Registered, RunEvent::ParityResolved) => Ok(RunState::ParityResolved),
        (RunState::ParityResolved, RunEvent::QuerySelected) => Ok(RunState::QuerySelected),
        (RunState::QuerySelected, RunEvent::SolutionPersisted) => Ok(RunState::Persisted),
        (RunState::Persisted, RunEvent::SubmissionAttempted { .. }) => Ok(RunState::Submitted),
        (RunState::Submitted, RunEvent::Finished) => Ok(RunState::Done),
        (
            RunState::Start
            | RunState::Registered
            | RunState::ParityResolved
            | RunState::QuerySelected,
            RunEvent::StepFailed { .. },
        ) => Ok(RunState::Aborted),
        _ => Err(TransitionError {
            from: current,
            event: format!("{event:?}"),
            reason: "invalid transition".to_string(),
        }),
    }
}
