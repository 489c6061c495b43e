//! Error type definitions for the host-facing layers
//!
//! The matching engine itself is total over its input domain and never
//! fails; errors only arise around it, when loading configuration and
//! input files.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Input file errors (channels, streams, EPG entries)
    #[error("Input error: {path} - {message}")]
    Input { path: String, message: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Create a configuration error with a custom message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an input error for a specific file
    pub fn input<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::Input {
            path: path.into(),
            message: message.into(),
        }
    }
}
