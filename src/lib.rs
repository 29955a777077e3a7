//! Client for the library management service: keeps the owner's session on
//! disk and decides which top-level flow (splash, auth, library setup, main)
//! is shown.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod logger;
pub mod session;
pub mod state;
pub mod utils;
