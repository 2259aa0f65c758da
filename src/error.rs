//! Crate-level error type.
//!
//! Each layer carries its own error enum; this wrapper exists so that callers
//! driving the whole pipeline can use a single `Result` alias.

use thiserror::Error;

/// Any error the deck-generation pipeline can produce.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Opc(#[from] crate::opc::OpcError),

    #[error(transparent)]
    Pptx(#[from] crate::pptx::PptxError),

    #[error(transparent)]
    Plan(#[from] crate::deck::PlanError),

    #[error(transparent)]
    Build(#[from] crate::deck::BuildError),

    #[error(transparent)]
    Llm(#[from] crate::llm::LlmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used by the crate root examples.
pub type Result<T> = std::result::Result<T, Error>;
