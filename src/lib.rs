//! Longan - Template-driven PowerPoint deck generation
//!
//! This library turns free-form text into a `.pptx` slide deck while preserving
//! the visual design of an uploaded template. It reads the template as an OPC
//! (Open Packaging Conventions) package, summarizes the layouts and images the
//! template offers, asks an LLM provider for a structured slide plan, and then
//! materializes that plan into a fresh presentation built on the template's
//! own masters, layouts and theme.
//!
//! # Features
//!
//! - **OPC package model**: ZIP-backed part graph with relationship traversal
//! - **Template inventory**: Per-layout placeholder counts and reusable images
//! - **Slide plan model**: Tolerant JSON decoding with recovery from chatty replies
//! - **Deck builder**: Replaces the template's slides with plan-driven ones
//! - **LLM clients**: OpenAI, Anthropic, Gemini and OpenRouter request shapes
//! - **HTTP service**: Multipart upload endpoint returning the finished deck
//!
//! # Example - Inspecting a template
//!
//! ```no_run
//! use longan::TemplateInventory;
//!
//! # fn main() -> longan::Result<()> {
//! let template = std::fs::read("template.pptx")?;
//! let inventory = TemplateInventory::extract(&template)?;
//!
//! for layout in &inventory.layouts {
//!     println!("layout {} has {} placeholders", layout.index, layout.placeholder_count);
//! }
//! for image in &inventory.images {
//!     println!("image: {}", image.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Building a deck from a plan
//!
//! ```no_run
//! use longan::{build_deck, parse_plan_text};
//!
//! # fn main() -> longan::Result<()> {
//! let template = std::fs::read("template.pptx")?;
//! let plan = parse_plan_text(r#"{"slides": [{"title": "Kickoff", "bullets": ["agenda"]}]}"#)?;
//!
//! let deck = build_deck(&template, &plan)?;
//! std::fs::write("generated.pptx", deck)?;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod config;
pub mod deck;
pub mod error;
pub mod llm;
pub mod logging;
pub mod opc;
pub mod pptx;
pub mod server;

pub use deck::{
    BuildError, ImageInfo, LayoutInfo, PlanError, SlidePlan, SlideSpec, TemplateInventory,
    build_deck, parse_plan_text,
};
pub use error::{Error, Result};
pub use pptx::PptxPackage;
