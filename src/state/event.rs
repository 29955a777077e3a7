//! Events that drive the session state, the store writes they cause, and the
//! record of how each event was handled.

use super::{Phase, StateError};
use crate::api::{Library, SignInResponse, SignUpResponse};
use crate::session::{SessionError, SessionRecord};

/// Specify the named events the session state accepts.
///
#[derive(Debug, Clone)]
pub enum Event {
    Bootstrap(Option<SessionRecord>),
    SignInStarted,
    SignInSucceeded(SignInResponse),
    SignInFailed(String),
    ClearSignInError,
    SignUpStarted,
    SignUpSucceeded(SignUpResponse),
    SignUpFailed(String),
    ClearSignUpError,
    LibraryCreated(Option<Library>),
    Logout,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Bootstrap(_) => "Bootstrap",
            Event::SignInStarted => "SignInStarted",
            Event::SignInSucceeded(_) => "SignInSucceeded",
            Event::SignInFailed(_) => "SignInFailed",
            Event::ClearSignInError => "ClearSignInError",
            Event::SignUpStarted => "SignUpStarted",
            Event::SignUpSucceeded(_) => "SignUpSucceeded",
            Event::SignUpFailed(_) => "SignUpFailed",
            Event::ClearSignUpError => "ClearSignUpError",
            Event::LibraryCreated(_) => "LibraryCreated",
            Event::Logout => "Logout",
        }
    }
}

/// Store writes requested by an applied event. They run after the in-memory
/// change has been committed.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Save { token: String, is_library_created: bool },
    UpdateLibraryFlag { token: String, is_library_created: bool },
    SaveLibrary(Library),
    Clear,
}

/// Describes how one event was handled.
///
#[derive(Debug)]
pub struct Transition {
    pub event: &'static str,
    pub from: Phase,
    pub to: Phase,
    /// Set when the event was refused; the state is then unchanged.
    pub rejected: Option<StateError>,
    /// Set when the in-memory change was committed but a store write failed.
    pub persistence: Option<SessionError>,
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        self.rejected.is_none()
    }

    pub fn is_persisted(&self) -> bool {
        self.persistence.is_none()
    }
}
