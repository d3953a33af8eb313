//! Error types for card operations.

use thiserror::Error;

/// Result type for card operations.
pub type CardResult<T> = Result<T, CardError>;

/// Errors that can occur while editing a document.
#[derive(Debug, Error)]
pub enum CardError {
    /// No element exists at the given index.
    #[error("Element index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of elements in the stack.
        len: usize,
    },

    /// The operation needs a text element.
    #[error("Element {0} is not a text element")]
    NotText(usize),

    /// The operation needs an image element.
    #[error("Element {0} is not an image element")]
    NotImage(usize),
}

/// Errors raised while importing the cards interchange format.
///
/// An import either succeeds for every card or fails as a whole.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The input is not well-formed XML.
    #[error("Malformed cards document: {0}")]
    Malformed(String),

    /// The input parsed but contains no `card` element.
    #[error("No cards found in document")]
    NoCards,
}

/// Errors raised while reading or writing configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file content is not valid JSON for the expected shape.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
