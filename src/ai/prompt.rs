//! Reusable prompts using Handlebars for templating. Handlebars adds
//! additional security controls since it can't do much out of the box
//! without registering your own helpers. This is ideal since output
//! from LLMs should be considered untrusted and Handlebars forces you
//! to add only what you need.

use std::fmt;

use handlebars::{Handlebars, RenderError, handlebars_helper, no_escape};
use serde_json::json;

use crate::ai::conversation::{BriefSchema, Preset, StyleBrief};

// A simple `inc` helper for use with `each` and `@index` so that
// there can be natural number sequences when rendering (instead of
// starting at 0).
handlebars_helper!(inc: |v: i64| format!("{}", v + 1));

/// System instruction used for the structured extraction call.
pub const EXTRACTION_SYSTEM_INSTRUCTION: &str = "JSON output only.";

#[derive(Debug)]
pub enum Prompt {
    SystemInstruction,
    Extraction,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const SYSTEM_INSTRUCTION_PROMPT: &str = r#"
You are the Visual Lab, a professional art director.
CURRENT MODE: {{mode}}

TONE:
- Professional, clean, agency style.
- No metaphors ("seeds", "journey"). Be direct.
- You deliver image concepts for BACKGROUNDS, not finished copy.
- Always plan for negative space (room for text).

FLOW:
1. Ask 1-2 precise questions (audience, vibe, format).
2. Propose an image concept (colors, light, subject).
3. Close the conversation once the concept is settled.

{{focus}}
"#;

const EXTRACTION_PROMPT: &str = r"
Create a JSON object with the following fields:
{{#each fields}}
{{inc @index}}. '{{name}}': {{description}}
{{/each}}
";

const BRIEF_HTML: &str = r#"<div class="style-brief">
{{#each fields}}
  <span class="label">{{label}}</span>
  {{#if (eq kind "prompt")}}
  <pre class="prompt-code">{{value}}</pre>
  {{else}}
  <div class="{{kind}}">{{value}}</div>
  {{/if}}
{{/each}}
</div>
"#;

const BRIEF_HTML_TEMPLATE: &str = "StyleBrief";

/// Templates for text sent to the service. Nothing is HTML escaped.
pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(no_escape);
    registry.register_helper("inc", Box::new(inc));
    registry
        .register_template_string(&Prompt::SystemInstruction.to_string(), SYSTEM_INSTRUCTION_PROMPT)
        .expect("Failed to register template");
    registry
        .register_template_string(&Prompt::Extraction.to_string(), EXTRACTION_PROMPT)
        .expect("Failed to register template");
    registry
}

/// Templates for the presentation layer. Values are HTML escaped since
/// they come straight from the service.
pub fn html_templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .register_template_string(BRIEF_HTML_TEMPLATE, BRIEF_HTML)
        .expect("Failed to register template");
    registry
}

pub fn system_instruction(registry: &Handlebars, preset: &Preset) -> Result<String, RenderError> {
    let data = json!({"mode": preset.id, "focus": preset.focus});
    registry
        .render(&Prompt::SystemInstruction.to_string(), &data)
        .map(|s| s.trim().to_string())
}

pub fn extraction_instruction(
    registry: &Handlebars,
    schema: &BriefSchema,
) -> Result<String, RenderError> {
    let fields: Vec<_> = schema
        .fields
        .iter()
        .map(|f| json!({"name": f.name, "description": f.description}))
        .collect();
    registry
        .render(&Prompt::Extraction.to_string(), &json!({ "fields": fields }))
        .map(|s| s.trim().to_string())
}

pub fn brief_html(registry: &Handlebars, brief: &StyleBrief) -> Result<String, RenderError> {
    registry.render(BRIEF_HTML_TEMPLATE, brief)
}
