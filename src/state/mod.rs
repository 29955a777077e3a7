//! Session state management module.
//!
//! This module contains the authentication state machine that decides which
//! top-level flow is shown, including:
//! - `Controller`, which owns the state and the store behind it
//! - `Session`, the in-memory state and its transition rules
//! - `Event` and `Transition`, the dispatch contract used by callers
//! - Navigation types (`Phase`, `Flow`)

mod controller;
mod error;
mod event;
mod navigation;
mod session;

pub use controller::{BootstrapOutcome, Controller};
pub use error::StateError;
pub use event::{Effect, Event, Transition};
pub use navigation::{Flow, Phase};
pub use session::Session;
