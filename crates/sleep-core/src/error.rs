use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the sleep inference pipeline.
#[derive(Error, Debug)]
pub enum SleepError {
    /// A source log could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report or chart could not be written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source log is not valid JSON.
    #[error("Failed to parse JSON in {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The entries path of a source does not start at an array in the document.
    #[error("Source \"{source_name}\" has no \"{key}\" array at the document root")]
    MissingRootKey { source_name: String, key: String },

    /// A configured field path could not be parsed.
    #[error("Invalid field path: {0}")]
    InvalidFieldPath(String),

    /// A timezone name is not a recognised IANA identifier.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A date-range bound is malformed, non-existent locally, or inverted.
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the workspace crates.
pub type Result<T> = std::result::Result<T, SleepError>;
