//! Renderer error types.

use std::time::Duration;

use thiserror::Error;

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for resource loading.
pub type LoadResult<T> = Result<T, ResourceLoadError>;

/// Result type for batch export.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while loading an image resource.
///
/// None of these are fatal to a document: the affected image is omitted.
#[derive(Debug, Error)]
pub enum ResourceLoadError {
    /// The load did not finish in time.
    #[error("Resource load timed out after {0:?}")]
    Timeout(Duration),

    /// The bytes are not a decodable image.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Transport failure or non-success HTTP status.
    #[error("Network error: {0}")]
    Network(String),

    /// A local file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The locator cannot be interpreted.
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),
}

/// Errors that can occur while rendering a card.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An image could not be prepared for embedding.
    #[error("Failed to prepare resource: {0}")]
    Resource(String),

    /// SVG building, rasterizing or encoding failed.
    #[error("Export failed: {0}")]
    Export(String),
}

/// Errors that abort a batch export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// There are no cards to export.
    #[error("Nothing to export: batch is empty")]
    EmptyBatch,

    /// The output archive could not be written.
    #[error("Archive error: {0}")]
    Archive(String),
}
