//! In-memory session store with fault injection, used to drive the
//! controller in tests.

use super::{SessionError, SessionRecord, SessionStore};
use crate::api::Library;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    record: Option<SessionRecord>,
    library: Option<Library>,
    failing: bool,
    library_failing: bool,
    read_delay: Option<Duration>,
    writes: usize,
}

#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Inner>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a store already holding `record`.
    ///
    pub fn with_record(record: SessionRecord) -> Self {
        MemorySessionStore {
            inner: Mutex::new(Inner {
                record: Some(record),
                ..Inner::default()
            }),
        }
    }

    /// Make every subsequent operation fail as if storage were unreachable.
    ///
    pub async fn set_failing(&self, failing: bool) {
        self.inner.lock().await.failing = failing;
    }

    /// Make only `save_library` fail.
    ///
    pub async fn set_library_failing(&self, failing: bool) {
        self.inner.lock().await.library_failing = failing;
    }

    /// Delay every subsequent `load` by `delay`.
    ///
    pub async fn set_read_delay(&self, delay: Duration) {
        self.inner.lock().await.read_delay = Some(delay);
    }

    /// Number of successful writes (saves, clears and library saves).
    ///
    pub async fn writes(&self) -> usize {
        self.inner.lock().await.writes
    }

    pub async fn record(&self) -> Option<SessionRecord> {
        self.inner.lock().await.record.clone()
    }
}

fn unavailable() -> SessionError {
    SessionError::Io {
        path: "memory".into(),
        source: std::io::Error::new(std::io::ErrorKind::Other, "storage unavailable"),
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, token: &str, is_library_created: bool) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().await;
        if inner.failing {
            return Err(unavailable());
        }
        inner.record = Some(SessionRecord::new(token, is_library_created));
        inner.writes += 1;
        Ok(())
    }

    async fn load(&self) -> Result<Option<SessionRecord>, SessionError> {
        let delay = self.inner.lock().await.read_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let inner = self.inner.lock().await;
        if inner.failing {
            return Err(unavailable());
        }
        Ok(inner.record.clone())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().await;
        if inner.failing {
            return Err(unavailable());
        }
        inner.record = None;
        inner.library = None;
        inner.writes += 1;
        Ok(())
    }

    async fn save_library(&self, library: &Library) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().await;
        if inner.failing || inner.library_failing {
            return Err(unavailable());
        }
        inner.library = Some(library.clone());
        inner.writes += 1;
        Ok(())
    }

    async fn load_library(&self) -> Result<Option<Library>, SessionError> {
        let inner = self.inner.lock().await;
        if inner.failing {
            return Err(unavailable());
        }
        Ok(inner.library.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clear_after_save_is_absent() {
        let store = MemorySessionStore::new();
        store.save("abc", false).await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn default_update_flag_on_absent_record_fails() {
        let store = MemorySessionStore::new();
        assert!(matches!(
            store.update_library_flag(true).await,
            Err(SessionError::Missing)
        ));
        assert_eq!(store.writes().await, 0);
    }

    #[tokio::test]
    async fn default_update_flag_rewrites_flag() {
        let store = MemorySessionStore::with_record(SessionRecord::new("t", false));
        store.update_library_flag(true).await.unwrap();
        assert_eq!(store.record().await, Some(SessionRecord::new("t", true)));
    }

    #[tokio::test]
    async fn failing_store_reports_errors() {
        let store = MemorySessionStore::new();
        store.set_failing(true).await;
        assert!(store.save("abc", true).await.is_err());
        assert!(store.load().await.is_err());
        assert!(store.clear().await.is_err());
    }
}
