//! Deck generation: template inventory, slide plans and the builder that
//! turns one into the other.
//!
//! The flow mirrors the request pipeline: [`TemplateInventory::extract`]
//! summarizes the uploaded template for the prompt, [`parse_plan_text`]
//! recovers a [`SlidePlan`] from the model's reply, and [`build_deck`]
//! replays that plan against a fresh copy of the same template bytes.

pub mod builder;
mod interpret;
pub mod inventory;
pub mod plan;

pub use builder::{BuildError, build_deck};
pub use inventory::{ImageInfo, LayoutInfo, TemplateInventory};
pub use plan::{PlanError, SlidePlan, SlideSpec, parse_plan_text};
