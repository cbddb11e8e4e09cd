//! Error types for the lighting output engine
use thiserror::Error;

/// Which of the two show queues a submission targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Priority,
    Background,
}

impl std::fmt::Display for QueueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueKind::Priority => f.write_str("priority"),
            QueueKind::Background => f.write_str("background"),
        }
    }
}

/// Station errors
#[derive(Error, Debug)]
pub enum StationError {
    /// Unknown animation name requested by an operator
    #[error("No such animation: {0}")]
    InvalidAnimation(String),

    /// A show queue is at its configured capacity
    #[error("The {queue} queue is full ({capacity} shows)")]
    QueueFull { queue: QueueKind, capacity: usize },

    /// Art-Net output error
    #[error("DMX error: {0}")]
    DmxError(String),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// Config file has an extension we cannot parse
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// Config file exceeds the load limit
    #[error("Config file too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// RON deserialization error
    #[error("RON error: {0}")]
    RonError(#[from] ron::error::SpannedError),

    /// Destination address could not be parsed
    #[error("Invalid address: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

/// Result type for station operations
pub type Result<T> = std::result::Result<T, StationError>;
