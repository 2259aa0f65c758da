//! The slide plan contract with the model, and recovery of plans from
//! replies that wrap the JSON in prose.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One slide to build. Every field is optional and defaults rather than
/// erroring, so a sloppy model reply still produces a deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideSpec {
    #[serde(default)]
    pub title: String,
    /// Index into the template's layout roster; out-of-range falls back to 0
    /// at build time.
    #[serde(default)]
    pub layout_index: i64,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_from_template_hint: Option<String>,
}

/// The full plan: slides in output order plus opaque metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlidePlan {
    #[serde(default)]
    pub slides: Vec<SlideSpec>,
    /// Passed through untouched; the builder never interprets it.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("LLM did not return valid JSON")]
    NoJsonObject,
    #[error("failed to parse plan JSON even after cleanup: {0}")]
    InvalidAfterRecovery(#[from] serde_json::Error),
}

// Static initialization: compiled only once, thread-safe
static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("Failed to build plan recovery pattern"));

/// Parse a model reply into a [`SlidePlan`].
///
/// Tries the reply verbatim first. When that fails (models like to wrap the
/// JSON in prose or code fences), retries on the outermost brace-delimited
/// span. A reply with no braces at all is [`PlanError::NoJsonObject`].
pub fn parse_plan_text(reply: &str) -> Result<SlidePlan, PlanError> {
    if let Ok(plan) = serde_json::from_str(reply) {
        return Ok(plan);
    }
    let recovered = JSON_OBJECT
        .find(reply)
        .ok_or(PlanError::NoJsonObject)?
        .as_str();
    Ok(serde_json::from_str(recovered)?)
}
