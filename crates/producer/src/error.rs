//! Error types for producers and the plugin runtime.

use thiserror::Error;

/// Errors from resolving, calling or closing a producer.
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("failed to start plugin '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("plugin '{name}' handshake failed: {source}")]
    Handshake {
        name: String,
        #[source]
        source: HandshakeError,
    },

    #[error("plugin '{name}' cannot dispense service '{service}': {message}")]
    Dispense {
        name: String,
        service: String,
        message: String,
    },

    #[error("plugin '{name}' RPC error: {message}")]
    Rpc { name: String, message: String },

    #[error("plugin '{name}' closed its connection")]
    Disconnected { name: String },

    #[error("produce failed: {0}")]
    Produce(String),

    #[error("missing config parameter '{0}'")]
    MissingParameter(String),

    #[error("this binary is a datagen producer plugin and must be started by datagen ({0} is not set)")]
    NotLaunchedAsPlugin(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a handshake between datagen and a plugin did not match.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("protocol version mismatch: expected {expected}, plugin speaks {got}")]
    VersionMismatch { expected: u32, got: u32 },

    #[error("magic cookie mismatch for key '{key}'")]
    CookieMismatch { key: String },

    #[error("malformed handshake line: {0}")]
    Malformed(String),

    #[error("plugin exited before completing the handshake")]
    Eof,

    #[error("timed out waiting for the handshake")]
    Timeout,
}
