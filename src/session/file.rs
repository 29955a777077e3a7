//! File-backed session store.

use super::{mask_token, SessionError, SessionRecord, SessionStore};
use crate::api::Library;
use async_trait::async_trait;
use log::*;
use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const SESSION_FILE_NAME: &str = "session.json";
const LIBRARY_FILE_NAME: &str = "library.json";

/// Keeps the session entry as a private JSON file inside a per-service
/// directory. Writes go through a temporary sibling and a rename so a reader
/// sees either the old entry or the new one.
///
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Return a store rooted at `<base_dir>/<service_name>`.
    ///
    pub fn new(base_dir: &Path, service_name: &str) -> Self {
        FileSessionStore {
            dir: base_dir.join(service_name),
        }
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE_NAME)
    }

    fn library_path(&self) -> PathBuf {
        self.dir.join(LIBRARY_FILE_NAME)
    }

    /// Serialize `value` and atomically replace the file at `path`.
    ///
    async fn write_entry<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), SessionError> {
        let content =
            serde_json::to_vec(value).map_err(|e| SessionError::Serialize(e.to_string()))?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let tmp_path = path.with_extension("json.tmp");
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&tmp_path)
            .await
            .map_err(|e| io_error(&tmp_path, e))?;
        file.write_all(&content)
            .await
            .map_err(|e| io_error(&tmp_path, e))?;
        file.sync_all().await.map_err(|e| io_error(&tmp_path, e))?;
        drop(file);

        fs::rename(&tmp_path, path)
            .await
            .map_err(|e| io_error(path, e))?;
        Ok(())
    }

    /// Read and parse the file at `path`, mapping a missing or empty file to
    /// `None`.
    ///
    async fn read_entry<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, SessionError> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(path, e)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| SessionError::Corrupt(e.to_string()))
    }

    async fn remove_entry(&self, path: &Path) -> Result<(), SessionError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(path, e)),
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> SessionError {
    SessionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(&self, token: &str, is_library_created: bool) -> Result<(), SessionError> {
        debug!(
            "Saving session for token {} (library created: {})...",
            mask_token(token),
            is_library_created
        );
        let record = SessionRecord::new(token, is_library_created);
        self.write_entry(&self.session_path(), &record).await
    }

    async fn load(&self) -> Result<Option<SessionRecord>, SessionError> {
        let record: Option<SessionRecord> = self.read_entry(&self.session_path()).await?;
        match record {
            Some(record) if record.token.is_empty() => {
                Err(SessionError::Corrupt("stored token is empty".to_string()))
            }
            record => Ok(record),
        }
    }

    async fn clear(&self) -> Result<(), SessionError> {
        debug!("Clearing stored session in {}...", self.dir.display());
        self.remove_entry(&self.session_path()).await?;
        self.remove_entry(&self.library_path()).await
    }

    async fn save_library(&self, library: &Library) -> Result<(), SessionError> {
        self.write_entry(&self.library_path(), library).await
    }

    async fn load_library(&self) -> Result<Option<Library>, SessionError> {
        self.read_entry(&self.library_path()).await
    }
}
