//! Epoch-level state machine

use std::fmt;

/// Where a [`TrainEvalLoop`](super::TrainEvalLoop) is in its run
///
/// `Initializing → Training(e) → Validating(e) → {Training(e+1) | EarlyStopped | Completed | Cancelled}`.
/// Cancellation is only observed at epoch boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Initializing,
    Training { epoch: usize },
    Validating { epoch: usize },
    EarlyStopped { epoch: usize },
    Completed,
    Cancelled,
}

impl LoopState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoopState::EarlyStopped { .. } | LoopState::Completed | LoopState::Cancelled)
    }

    /// Whether `self → next` is a legal edge
    pub fn can_transition_to(self, next: LoopState) -> bool {
        use LoopState::*;
        match (self, next) {
            (Initializing, Training { epoch }) => epoch == 0,
            (Initializing, Completed | Cancelled) => true,
            (Training { epoch: a }, Validating { epoch: b }) => a == b,
            (Validating { epoch: a }, Training { epoch: b }) => b == a + 1,
            (Validating { epoch: a }, EarlyStopped { epoch: b }) => a == b,
            (Validating { .. }, Completed | Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::Initializing => write!(f, "initializing"),
            LoopState::Training { epoch } => write!(f, "training(epoch {epoch})"),
            LoopState::Validating { epoch } => write!(f, "validating(epoch {epoch})"),
            LoopState::EarlyStopped { epoch } => write!(f, "early-stopped(epoch {epoch})"),
            LoopState::Completed => write!(f, "completed"),
            LoopState::Cancelled => write!(f, "cancelled"),
        }
    }
}
