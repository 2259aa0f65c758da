//! Error types for the PresentationML layer.

use crate::opc::OpcError;
use thiserror::Error;

/// Errors raised while reading or rewriting presentation parts.
#[derive(Debug, Error)]
pub enum PptxError {
    /// Error from the underlying package layer
    #[error(transparent)]
    Opc(#[from] OpcError),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// A required part is missing
    #[error("part not found: {0}")]
    PartNotFound(String),

    /// The package's main part is not a presentation
    #[error("not a presentation: expected content type {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// Image bytes whose format could not be recognized
    #[error("unrecognized image format")]
    UnknownImageFormat,

    /// A shape that was expected to be a placeholder is not one
    #[error("shape {0:?} is not a placeholder")]
    NotAPlaceholder(String),
}

/// Result type for PresentationML operations.
pub type Result<T> = std::result::Result<T, PptxError>;
