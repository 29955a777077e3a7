//! Durable session persistence.
//!
//! This module defines the stored session entry and the contract every
//! backing store must honour:
//! - `save` replaces the whole entry at once
//! - `load` returns `None` when nothing has been stored
//! - `clear` removes the entry along with any cached library details
//! - `update_library_flag` rewrites the flag while keeping the stored token
//!
//! Storage faults are reported as `SessionError` and never panic.

mod error;
mod file;
#[cfg(test)]
mod memory;

pub use error::SessionError;
pub use file::FileSessionStore;
#[cfg(test)]
pub use memory::MemorySessionStore;

use crate::api::Library;
use async_trait::async_trait;
use fake::Dummy;
use serde::{Deserialize, Serialize};

/// Namespace the session entry is stored under unless configured otherwise.
pub const DEFAULT_SERVICE_NAME: &str = "LibraryApp";

/// Persisted credential plus the library-setup flag.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    /// `None` when the entry was written without the flag.
    #[serde(rename = "isLibraryCreated", default)]
    pub is_library_created: Option<bool>,
}

impl SessionRecord {
    pub fn new(token: &str, is_library_created: bool) -> Self {
        SessionRecord {
            token: token.to_owned(),
            is_library_created: Some(is_library_created),
        }
    }
}

/// Storage for the single session entry of one service namespace.
///
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Overwrite any stored entry with the given token and flag.
    async fn save(&self, token: &str, is_library_created: bool) -> Result<(), SessionError>;

    /// Return the most recently saved entry, or `None` if nothing is stored.
    async fn load(&self) -> Result<Option<SessionRecord>, SessionError>;

    /// Remove the stored entry and the cached library.
    async fn clear(&self) -> Result<(), SessionError>;

    /// Keep the stored token and replace the flag. Fails with
    /// `SessionError::Missing` when nothing is stored.
    async fn update_library_flag(&self, is_library_created: bool) -> Result<(), SessionError> {
        match self.load().await? {
            Some(record) => self.save(&record.token, is_library_created).await,
            None => Err(SessionError::Missing),
        }
    }

    async fn save_library(&self, library: &Library) -> Result<(), SessionError>;

    async fn load_library(&self) -> Result<Option<Library>, SessionError>;
}

/// Return a printable form of a token that never reveals it in full.
///
pub fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}…", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_wire_field_names() {
        let record = SessionRecord::new("abc", true);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["token"], "abc");
        assert_eq!(json["isLibraryCreated"], true);
    }

    #[test]
    fn record_without_flag_parses_as_unknown() {
        let record: SessionRecord = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert_eq!(record.token, "abc");
        assert_eq!(record.is_library_created, None);
    }

    #[test]
    fn record_ignores_unknown_fields() {
        let record: SessionRecord =
            serde_json::from_str(r#"{"token":"abc","isLibraryCreated":false,"extra":1}"#).unwrap();
        assert_eq!(record, SessionRecord::new("abc", false));
    }

    #[test]
    fn mask_token_hides_the_tail() {
        assert_eq!(mask_token("abcdefgh"), "abcd…");
        assert_eq!(mask_token("abc"), "****");
        assert_eq!(mask_token(""), "****");
    }
}
