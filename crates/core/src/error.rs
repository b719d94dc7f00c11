//! Error types for slide-deck content extraction.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting content from a slide deck.
///
/// Every variant here is fatal for the run: the caller never receives a
/// partial deck. Recoverable conditions (a single failed OCR, a model
/// hiccup) are absorbed closer to where they happen and never surface
/// through this type.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a recognizable PPTX archive.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing error in a presentation part.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// Failed to extract content from a slide.
    #[error("Slide extraction error: {0}")]
    Extraction(String),
}
