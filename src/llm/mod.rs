//! Provider-agnostic plan acquisition over HTTP.
//!
//! Four hosted chat APIs with three wire formats; [`LlmClient::complete`]
//! hides the differences behind "send prompt, receive text".

pub mod client;
pub mod prompt;

pub use client::{LlmClient, LlmError, Provider, ProviderEndpoints};
pub use prompt::build_plan_prompt;
