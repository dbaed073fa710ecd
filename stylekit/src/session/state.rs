//! Observable session state.

use super::error::SessionError;
use crate::pipeline::PipelineSummary;
use std::fmt;

/// Where a session is in its lifecycle.
///
/// Published on a watch channel; every transition replaces the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    /// Not started, or replaced by a newer run.
    #[default]
    Idle,
    /// Waiting for the style document.
    FetchingStyle,
    /// Style parsed; waiting for TileJSON and sprite fetches.
    FetchingResources { outstanding: usize },
    /// Building and attaching the pipeline.
    Building,
    /// A pipeline is attached to the view.
    Attached(PipelineSummary),
    /// The run failed. Nothing is attached.
    Aborted(SessionError),
    /// Stopped by the caller.
    Stopped,
}

impl SessionState {
    /// Attached, Aborted and Stopped end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Attached(_) | Self::Aborted(_) | Self::Stopped)
    }

    /// The outcome this state represents, if terminal.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        match self {
            Self::Attached(summary) => Some(SessionOutcome::Attached(summary.clone())),
            Self::Aborted(err) => Some(SessionOutcome::Failed(err.clone())),
            Self::Stopped => Some(SessionOutcome::Stopped),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::FetchingStyle => write!(f, "FetchingStyle"),
            Self::FetchingResources { outstanding } => {
                write!(f, "FetchingResources ({} outstanding)", outstanding)
            }
            Self::Building => write!(f, "Building"),
            Self::Attached(summary) => write!(f, "Attached ({})", summary.kind),
            Self::Aborted(err) => write!(f, "Aborted ({})", err),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// How a session run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Attached(PipelineSummary),
    Failed(SessionError),
    Stopped,
}

impl SessionOutcome {
    pub fn is_attached(&self) -> bool {
        matches!(self, Self::Attached(_))
    }

    pub fn error(&self) -> Option<&SessionError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!SessionState::Idle.is_terminal());
        assert!(!SessionState::FetchingStyle.is_terminal());
        assert!(!SessionState::Building.is_terminal());
        assert!(SessionState::Stopped.is_terminal());
        assert!(SessionState::Aborted(SessionError::Configuration("x".into())).is_terminal());
    }

    #[test]
    fn test_outcome_from_state() {
        assert_eq!(SessionState::Stopped.outcome(), Some(SessionOutcome::Stopped));
        assert_eq!(SessionState::Building.outcome(), None);

        let err = SessionError::Configuration("no view".into());
        let outcome = SessionState::Aborted(err.clone()).outcome().unwrap();
        assert_eq!(outcome.error(), Some(&err));
        assert!(!outcome.is_attached());
    }
}
