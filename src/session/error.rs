//! Session store error types.

use std::path::PathBuf;

/// Errors that can occur while reading or writing the persisted session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Underlying storage could not be reached
    #[error("Session storage unavailable at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Stored entry exists but cannot be understood
    #[error("Stored session is corrupt: {0}")]
    Corrupt(String),

    /// An update was requested but no session is stored
    #[error("No stored session to update")]
    Missing,

    /// Failed to serialize the session entry
    #[error("Failed to serialize session: {0}")]
    Serialize(String),

    /// The bootstrap read did not finish in time
    #[error("Session read timed out after {0} ms")]
    Timeout(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        let error = SessionError::Missing;
        assert!(error.to_string().contains("No stored session"));

        let error = SessionError::Corrupt("expected value".to_string());
        assert!(error.to_string().contains("corrupt"));
        assert!(error.to_string().contains("expected value"));

        let error = SessionError::Timeout(250);
        assert!(error.to_string().contains("250 ms"));
    }

    #[test]
    fn test_session_error_with_path() {
        let error = SessionError::Io {
            path: PathBuf::from("/keys/LibraryApp/session.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(error.to_string().contains("/keys/LibraryApp/session.json"));
    }
}
