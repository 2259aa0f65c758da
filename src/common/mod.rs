//! Shared utilities used by the package and slide layers.

// Submodule declarations
pub mod unit;
pub mod xml;

// Re-exports for convenience
pub use unit::{EMUS_PER_CM, EMUS_PER_INCH, emu_to_inches, inches_to_emu};
pub use xml::{escape_xml, unescape_xml};
