//! Remote fetch error types

/// Errors a remote source can report for one fetch.
///
/// Fetch errors are recoverable: the controller keeps the last successful
/// view on screen and waits for the caller to re-trigger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The caller's transport failed (network, auth, server error).
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The source answered with a page the engine cannot accept.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

impl FetchError {
    /// Creates a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a new invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}
