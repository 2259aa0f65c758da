//! Error types for OPC package reading and writing.

use thiserror::Error;

/// Errors that can occur while working with an OPC package.
#[derive(Debug, Error)]
pub enum OpcError {
    /// I/O error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP container error
    #[error("ZIP archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// A pack URI failed validation
    #[error("invalid pack URI: {0}")]
    InvalidPackUri(String),

    /// A referenced part is absent from the package
    #[error("part not found: {0}")]
    PartNotFound(String),

    /// No content type registered for a part
    #[error("no content type for part: {0}")]
    MissingContentType(String),

    /// No relationship with the requested id or type
    #[error("relationship not found: {0}")]
    RelationshipNotFound(String),

    /// More than one relationship where exactly one was expected
    #[error("expected one relationship of type {reltype}, found {count}")]
    AmbiguousRelationship { reltype: String, count: usize },

    /// Ran out of candidate part names for a template
    #[error("no free part name left for template {0}")]
    PartnameExhausted(String),
}

/// Result type for OPC operations.
pub type Result<T> = std::result::Result<T, OpcError>;
