//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>ms, <number>s, <number>m, or combinations (e.g., 100ms, 30s, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Buffer construction and contract errors
#[derive(Debug, Clone, Error)]
pub enum BufferError {
    #[error("Invalid buffer request: {0}")]
    Validation(String),

    #[error("Failed to allocate buffer of {samples} samples")]
    Allocation { samples: usize },
}

/// File codec errors
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    #[error("Failed to create output file: {0}")]
    Create(String),

    #[error("Failed to write samples: {0}")]
    Write(String),

    #[error("Failed to finalize output file: {0}")]
    Finalize(String),
}

/// Errors from exporting a window of retained audio
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    #[error("Invalid export request: {0}")]
    Validation(String),

    #[error("Insufficient data: requested {requested} samples, produced {produced}")]
    InsufficientData { requested: usize, produced: usize },

    #[error("Export failed: {0}")]
    Write(#[from] CodecError),

    #[error("No audio has been captured yet")]
    NotConfigured,

    #[error("No marker is armed")]
    NoMarker,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
