//! Library API error types.

/// Errors that can occur while talking to the library service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Failed to deserialize API response
    #[error("Failed to deserialize API response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Response parsed but is missing something the client depends on
    #[error("Unexpected API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Return the text to show the user, preferring the message the service
    /// sent and otherwise using `fallback`.
    ///
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Rejected { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}
