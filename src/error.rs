//! Error types for promptdeck

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for promptdeck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for promptdeck
#[derive(Debug, Error)]
pub enum Error {
    /// The prompt registry could not be reached, authenticated to, or understood
    #[error("Prompt registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// The model identifier does not belong to any known model family
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    /// The inference response did not carry text where the model family puts it
    #[error("Unrecognized response shape from {model}: {reason}")]
    UnrecognizedResponseShape {
        /// Model identifier that produced the response
        model: String,
        /// What was missing or malformed
        reason: String,
    },

    /// The inference endpoint answered with a failure status
    #[error("Transport error: {0}")]
    Transport(String),

    /// The inference endpoint rejected the credentials
    #[error("Authentication error: {0}")]
    Auth(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Conversation file could not be written or read back
    #[error("Persistence error: {}: {reason}", .path.display())]
    Persistence {
        /// Conversation file
        path: PathBuf,
        /// Underlying I/O or decoding failure
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a registry-unavailable error
    pub fn registry_unavailable(msg: impl Into<String>) -> Self {
        Self::RegistryUnavailable(msg.into())
    }

    /// Create an unsupported-model error
    pub fn unsupported_model(model_id: impl Into<String>) -> Self {
        Self::UnsupportedModel(model_id.into())
    }

    /// Create an unrecognized-response-shape error
    pub fn unrecognized_shape(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnrecognizedResponseShape {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a persistence error for `path`
    pub fn persistence(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Persistence {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error came from the network path to the inference endpoint
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Http(_))
    }
}
