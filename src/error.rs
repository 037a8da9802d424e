//! Error types for the Cryptoton tracker.

use thiserror::Error;

/// The main error type for Cryptoton.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file operations, stdin, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level HTTP errors, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream provider answered with a non-success status.
    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Blob store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid input or state
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_pick_variant() {
        assert!(matches!(Error::config("bad"), Error::Config(m) if m == "bad"));
        assert!(matches!(Error::storage("full"), Error::Storage(_)));
        assert!(matches!(Error::invalid_input("x"), Error::InvalidInput(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::UpstreamStatus(429).to_string(),
            "Upstream returned status 429"
        );
    }
}
