//! Error types for the curve engine
//!
//! Every failure that can reach the dispatch boundary is an [`EngineError`];
//! the boundary turns it into a failure response carrying its `Display` text.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Request named an operation the engine does not know
    #[error("Unknown message type: {kind}")]
    UnknownOperation { kind: String },

    /// Request payload did not match the operation's shape
    #[error("Invalid payload for '{kind}': {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// Request envelope itself could not be read
    #[error("Malformed request: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    /// Result could not be encoded
    #[error("Failed to encode result: {0}")]
    Encode(#[source] serde_json::Error),

    /// Handler panicked while processing a request
    #[error("'{kind}' handler failed: {message}")]
    Panicked { kind: String, message: String },

    /// No response arrived within the caller's timeout
    #[error("Request '{id}' timed out after {waited:?}")]
    Timeout { id: String, waited: Duration },

    /// Worker thread could not be started
    #[error("Failed to start engine worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// Worker thread is gone
    #[error("Engine worker is not running")]
    WorkerDisconnected,

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Get a short title for the error (for log lines)
    pub fn title(&self) -> &'static str {
        match self {
            EngineError::UnknownOperation { .. } => "Unknown Operation",
            EngineError::InvalidPayload { .. } => "Invalid Payload",
            EngineError::MalformedEnvelope(_) => "Malformed Request",
            EngineError::Encode(_) => "Encode Error",
            EngineError::Panicked { .. } => "Handler Failure",
            EngineError::Timeout { .. } => "Timeout",
            EngineError::WorkerSpawn(_) => "Worker Start Failure",
            EngineError::WorkerDisconnected => "Worker Disconnected",
            EngineError::Config(_) => "Configuration Error",
        }
    }
}
