//! In-memory session state and the transition table that moves it between
//! phases.

use super::event::{Effect, Event};
use super::{Phase, StateError};
use crate::api::{Library, Owner};
use log::*;

/// Houses the in-memory session: the current phase, the credential that put
/// it there, and the short-lived fields each sign-in or sign-up attempt
/// shows while it runs.
///
/// Mutated only through `apply`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    phase: Phase,
    token: Option<String>,
    is_library_created: Option<bool>,
    owner: Option<Owner>,
    library: Option<Library>,
    sign_in_pending: bool,
    sign_in_error: Option<String>,
    sign_up_pending: bool,
    sign_up_error: Option<String>,
    sign_up_message: Option<String>,
}

impl Session {
    pub fn get_phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase.is_authenticated()
    }

    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Library flag, reported as unknown whenever no owner is signed in.
    ///
    pub fn get_is_library_created(&self) -> Option<bool> {
        if self.is_authenticated() {
            self.is_library_created
        } else {
            None
        }
    }

    pub fn get_owner(&self) -> Option<&Owner> {
        self.owner.as_ref()
    }

    pub fn get_library(&self) -> Option<&Library> {
        self.library.as_ref()
    }

    pub fn is_sign_in_pending(&self) -> bool {
        self.sign_in_pending
    }

    pub fn get_sign_in_error(&self) -> Option<&str> {
        self.sign_in_error.as_deref()
    }

    pub fn is_sign_up_pending(&self) -> bool {
        self.sign_up_pending
    }

    pub fn get_sign_up_error(&self) -> Option<&str> {
        self.sign_up_error.as_deref()
    }

    pub fn get_sign_up_message(&self) -> Option<&str> {
        self.sign_up_message.as_deref()
    }

    /// Apply `event`, returning the store writes it requires. A refused
    /// event leaves the session untouched.
    ///
    pub fn apply(&mut self, event: Event) -> Result<Vec<Effect>, StateError> {
        let phase = self.phase;
        let refuse = |event: &Event| StateError::InvalidTransition {
            event: event.name(),
            phase,
        };

        if phase == Phase::Loading && !matches!(event, Event::Bootstrap(_)) {
            return Err(refuse(&event));
        }

        match event {
            Event::Bootstrap(record) => {
                if phase != Phase::Loading {
                    return Err(refuse(&Event::Bootstrap(record)));
                }
                match record.filter(|r| !r.token.is_empty()) {
                    Some(record) => {
                        self.phase = Phase::authenticated(record.is_library_created);
                        self.token = Some(record.token);
                        self.is_library_created = record.is_library_created;
                    }
                    None => self.phase = Phase::Unauthenticated,
                }
                Ok(vec![])
            }
            Event::SignInStarted => {
                if phase != Phase::Unauthenticated {
                    return Err(refuse(&Event::SignInStarted));
                }
                self.sign_in_pending = true;
                self.sign_in_error = None;
                Ok(vec![])
            }
            Event::SignInSucceeded(response) => {
                self.sign_in_pending = false;
                self.sign_in_error = None;
                self.owner = Some(response.owner);
                Ok(self.authenticate(response.token, response.is_library_created))
            }
            Event::SignInFailed(message) => {
                if phase != Phase::Unauthenticated {
                    return Err(refuse(&Event::SignInFailed(message)));
                }
                self.sign_in_pending = false;
                self.sign_in_error = Some(message);
                Ok(vec![])
            }
            Event::ClearSignInError => {
                self.sign_in_error = None;
                Ok(vec![])
            }
            Event::SignUpStarted => {
                if phase != Phase::Unauthenticated {
                    return Err(refuse(&Event::SignUpStarted));
                }
                self.sign_up_pending = true;
                self.sign_up_error = None;
                self.sign_up_message = None;
                Ok(vec![])
            }
            Event::SignUpSucceeded(response) => {
                self.sign_up_pending = false;
                self.sign_up_error = None;
                self.sign_up_message = Some(response.message).filter(|m| !m.is_empty());
                self.owner = Some(response.owner);
                Ok(self.authenticate(response.token, response.is_library_created))
            }
            Event::SignUpFailed(message) => {
                if phase != Phase::Unauthenticated {
                    return Err(refuse(&Event::SignUpFailed(message)));
                }
                self.sign_up_pending = false;
                self.sign_up_error = Some(message);
                Ok(vec![])
            }
            Event::ClearSignUpError => {
                self.sign_up_error = None;
                Ok(vec![])
            }
            Event::LibraryCreated(library) => {
                let token = match (phase, self.token.clone()) {
                    (Phase::AuthenticatedNoLibrary, Some(token)) => token,
                    _ => return Err(refuse(&Event::LibraryCreated(library))),
                };
                self.phase = Phase::AuthenticatedReady;
                self.is_library_created = Some(true);
                let mut effects = vec![Effect::UpdateLibraryFlag {
                    token,
                    is_library_created: true,
                }];
                if let Some(library) = library {
                    effects.push(Effect::SaveLibrary(library.clone()));
                    self.library = Some(library);
                }
                Ok(effects)
            }
            Event::Logout => {
                if phase == Phase::Unauthenticated {
                    debug!("Logout requested while signed out; nothing to do.");
                    return Ok(vec![]);
                }
                *self = Session {
                    phase: Phase::Unauthenticated,
                    ..Session::default()
                };
                Ok(vec![Effect::Clear])
            }
        }
    }

    fn authenticate(&mut self, token: String, is_library_created: bool) -> Vec<Effect> {
        self.phase = Phase::authenticated(Some(is_library_created));
        self.token = Some(token.clone());
        self.is_library_created = Some(is_library_created);
        vec![Effect::Save {
            token,
            is_library_created,
        }]
    }
}
