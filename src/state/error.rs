//! State machine error types.

use super::Phase;

/// Errors that can occur while applying events to the session state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// Event is not allowed from the current phase
    #[error("Invalid transition: {event} while {phase:?}")]
    InvalidTransition { event: &'static str, phase: Phase },

    /// Action requires a signed-in owner
    #[error("No owner is signed in")]
    NotAuthenticated,
}
