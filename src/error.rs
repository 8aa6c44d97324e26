//! Error types for speech command matching

use thiserror::Error;

/// Result type alias for speech command operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by command callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while registering or matching commands
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Command pattern could not be compiled
    #[error("invalid command pattern '{pattern}': {reason}")]
    Pattern {
        /// Pattern as registered
        pattern: String,
        /// What is wrong with it
        reason: String,
    },

    /// A command callback failed, aborting the matching pass
    #[error("callback for command '{command}' failed: {source}")]
    Callback {
        /// Subcommand that matched
        command: String,
        /// Error raised by the callback
        #[source]
        source: BoxError,
    },

    /// Recognition engine error
    #[error("recognition engine error: {0}")]
    Engine(String),

    /// Microphone access was denied or no input device exists
    #[error("microphone unavailable")]
    MicrophoneUnavailable,

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Build a pattern error
    pub(crate) fn pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}
