//! PresentationML layer over the OPC package model.
//!
//! Wraps an [`crate::opc::OpcPackage`] with presentation-aware accessors:
//! the slide list, the layout roster of the first master, placeholder
//! scanning, media management and slide XML synthesis.

pub mod core_props;
pub mod error;
pub mod media;
pub mod package;
pub mod placeholder;
pub mod presentation;
pub mod shapes;
pub mod writer;

#[cfg(test)]
pub(crate) mod fixture;

pub use error::{PptxError, Result};
pub use media::{ImageFormat, MediaRegistry};
pub use package::PptxPackage;
pub use placeholder::PlaceholderRole;
pub use shapes::{ShapeInfo, ShapeKind, top_level_shapes};
