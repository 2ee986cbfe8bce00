//! Error types for the assistant and its export pipeline.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while chatting or exporting.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read an input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported (uploads accept plain text only).
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// An uploaded file was not valid UTF-8.
    #[error("File is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// ZIP archive error while writing or reading a package.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML error while writing or reading a package part.
    #[error("XML error: {0}")]
    XmlError(String),

    /// The language-model service failed or returned something unusable.
    #[error("Language model error: {0}")]
    LlmError(String),

    /// The language-model service did not answer in time.
    #[error("Language model did not respond within {timeout:?}")]
    LlmTimeout {
        /// Configured timeout that elapsed.
        timeout: Duration,
    },

    /// There is no message to act on or export.
    #[error("No chat history. Start a conversation first.")]
    EmptySession,
}
