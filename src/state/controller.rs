//! Runs session events against the store.

use super::event::{Effect, Event, Transition};
use super::{Phase, Session};
use crate::api::Library;
use crate::session::{mask_token, SessionError, SessionRecord, SessionStore};
use log::*;
use std::sync::Arc;
use std::time::Duration;

/// What the bootstrap read found.
///
#[derive(Debug)]
pub enum BootstrapOutcome {
    /// A stored session was restored.
    Restored,
    /// Nothing was stored.
    Fresh,
    /// The store could not be read; treated as signed out.
    Recovered(SessionError),
}

/// Owns the session state and the store behind it. Every event runs to
/// completion, store writes included, before the next one can start.
///
pub struct Controller {
    store: Arc<dyn SessionStore>,
    session: Session,
    bootstrap: Option<BootstrapOutcome>,
}

impl Controller {
    /// Return a controller in the loading phase.
    ///
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Controller {
            store,
            session: Session::default(),
            bootstrap: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.get_phase()
    }

    pub fn bootstrap_outcome(&self) -> Option<&BootstrapOutcome> {
        self.bootstrap.as_ref()
    }

    /// Seed the session from the store. The read starts at once and is
    /// bounded by `timeout`; the call returns no earlier than `min_splash`.
    /// A failed or late read leaves the owner signed out.
    ///
    pub async fn bootstrap(&mut self, timeout: Duration, min_splash: Duration) -> Transition {
        debug!("Reading stored session...");
        let store = Arc::clone(&self.store);
        let read = tokio::time::timeout(timeout, async move { store.load().await });
        let (read, _) = tokio::join!(read, tokio::time::sleep(min_splash));

        let (record, outcome) = match read {
            Ok(Ok(Some(record))) => {
                info!("Restored session for token {}.", mask_token(&record.token));
                (Some(record), BootstrapOutcome::Restored)
            }
            Ok(Ok(None)) => {
                info!("No stored session found.");
                (None, BootstrapOutcome::Fresh)
            }
            Ok(Err(e)) => {
                warn!("Failed to read stored session, starting signed out: {}", e);
                (None, BootstrapOutcome::Recovered(e))
            }
            Err(_) => {
                let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                warn!("Stored session read timed out after {} ms, starting signed out.", millis);
                (None, BootstrapOutcome::Recovered(SessionError::Timeout(millis)))
            }
        };
        let transition = self.dispatch(Event::Bootstrap(record)).await;
        if transition.is_applied() {
            self.bootstrap = Some(outcome);
        }
        transition
    }

    /// Apply `event` to the session, then run the store writes it requires.
    /// Never fails: a refused event or a failed write is recorded on the
    /// returned `Transition`.
    ///
    pub async fn dispatch(&mut self, event: Event) -> Transition {
        let name = event.name();
        let from = self.session.get_phase();
        debug!("Processing session event '{}' in phase {:?}...", name, from);

        let effects = match self.session.apply(event) {
            Ok(effects) => effects,
            Err(e) => {
                warn!("Ignoring session event: {}", e);
                return Transition {
                    event: name,
                    from,
                    to: from,
                    rejected: Some(e),
                    persistence: None,
                };
            }
        };

        let to = self.session.get_phase();
        if from != to {
            info!("Session moved from {:?} to {:?}.", from, to);
        }

        let mut persistence = None;
        for effect in effects {
            if let Err(e) = self.run(effect).await {
                error!("Failed to persist session after '{}': {}", name, e);
                persistence.get_or_insert(e);
            }
        }

        Transition {
            event: name,
            from,
            to,
            rejected: None,
            persistence,
        }
    }

    /// Write the current in-memory session, and the library it holds if any,
    /// to the store again. Used after a transition reported a persistence
    /// failure.
    ///
    pub async fn persist(&mut self) -> Result<(), SessionError> {
        match (self.session.get_token(), self.session.get_is_library_created()) {
            (Some(token), Some(flag)) => self.store.save(token, flag).await?,
            (Some(token), None) => self.store.save(token, true).await?,
            _ => return self.store.clear().await,
        }
        match self.session.get_library() {
            Some(library) => self.store.save_library(library).await,
            None => Ok(()),
        }
    }

    async fn run(&self, effect: Effect) -> Result<(), SessionError> {
        match effect {
            Effect::Save {
                token,
                is_library_created,
            } => self.store.save(&token, is_library_created).await,
            Effect::UpdateLibraryFlag {
                token,
                is_library_created,
            } => match self.store.update_library_flag(is_library_created).await {
                Err(SessionError::Missing) => {
                    warn!("No stored session to update, saving the current one instead.");
                    self.store.save(&token, is_library_created).await
                }
                result => result,
            },
            Effect::SaveLibrary(library) => self.store.save_library(&library).await,
            Effect::Clear => self.store.clear().await,
        }
    }

    /// Return the record the store currently holds, treating a read failure
    /// as absent.
    ///
    pub async fn stored_record(&self) -> Option<SessionRecord> {
        self.store.load().await.unwrap_or_else(|e| {
            warn!("Failed to read stored session: {}", e);
            None
        })
    }

    /// Return the library cached when setup completed, if any.
    ///
    pub async fn stored_library(&self) -> Option<Library> {
        match self.store.load_library().await {
            Ok(library) => library,
            Err(e) => {
                warn!("Failed to read cached library: {}", e);
                None
            }
        }
    }
}
