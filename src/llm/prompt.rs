//! Planning prompt assembly.

use crate::llm::client::Provider;

/// Compose the planning prompt sent to the provider.
///
/// `inventory_json` is the pretty-printed [`TemplateInventory`]; it is quoted
/// to the model as advisory context, with the plan schema spelled out so the
/// reply can be parsed by [`parse_plan_text`].
///
/// [`TemplateInventory`]: crate::deck::TemplateInventory
/// [`parse_plan_text`]: crate::deck::parse_plan_text
pub fn build_plan_prompt(
    text: &str,
    guidance: &str,
    provider: Provider,
    inventory_json: &str,
) -> String {
    format!(
        r#"
You are to create a structured slide plan from the given text.

Inventory of available layouts and images (do not include this in the output):
{inventory_json}

Guidance: {guidance}

Text to convert into slides:
{text}

Output:
- STRICTLY return valid JSON.
- No comments, explanations, or text outside JSON.
- Schema:
{{
  "slides": [
    {{
      "title": "string - title of the slide",
      "layout_index": 0,
      "bullets": ["string", "string"],
      "notes": "string - speaker notes, optional",
      "image_from_template_hint": "string or empty"
    }}
  ],
  "metadata": {{
    "total_slides": int,
    "generated_by": "{provider}",
    "guidance_used": "{guidance}"
  }}
}}
"#
    )
}
