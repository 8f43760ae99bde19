//! Error types for the ACE domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] aggregates them.
//!
//! Malformed model output has no variant here: the response parser always
//! degrades to a documented default.

use thiserror::Error;

/// The top-level error type for ACE operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Inference backend errors ---
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Context snapshots ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures talking to the inference backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// The request never completed: connection refused, DNS, broken pipe.
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The backend answered with a non-success status or an unreadable body.
    #[error("Backend error: {message} (status: {status_code})")]
    Backend { status_code: u16, message: String },

    #[error("Client not initialized")]
    NotInitialized,

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),
}

impl InferenceError {
    /// Whether this failure happened below the HTTP status layer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout(_) | Self::StreamInterrupted(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_displays_status() {
        let err = Error::Inference(InferenceError::Backend {
            status_code: 503,
            message: "model loading".into(),
        });
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("model loading"));
    }

    #[test]
    fn snapshot_failures_convert() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Serialization(_)));

        let err: Error = std::io::Error::from(std::io::ErrorKind::NotFound).into();
        assert!(err.to_string().starts_with("I/O error: "));
    }

    #[test]
    fn transport_classification() {
        assert!(InferenceError::Timeout("120s".into()).is_transport());
        assert!(InferenceError::Transport("refused".into()).is_transport());
        assert!(!InferenceError::NotInitialized.is_transport());
        assert!(
            !InferenceError::Backend {
                status_code: 500,
                message: String::new()
            }
            .is_transport()
        );
    }

    #[test]
    fn not_initialized_message() {
        assert_eq!(
            InferenceError::NotInitialized.to_string(),
            "Client not initialized"
        );
    }
}
