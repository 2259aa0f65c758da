//! Open Packaging Conventions (OPC) layer.
//!
//! An Office file is a ZIP archive of *parts* joined by *relationships*. This
//! module models that physical container: pack URIs, the content-type map,
//! relationship collections, and a package type that loads parts by walking
//! the relationship graph and serializes them back out the same way.
//!
//! Parts that exist in the archive but are unreachable from the package
//! relationships are dropped on save, mirroring how desktop Office rewrites
//! packages.

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

pub use error::{OpcError, Result};
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::Part;
pub use rel::{Relationship, Relationships};
