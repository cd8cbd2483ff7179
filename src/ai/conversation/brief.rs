//! The structured result of a finished conversation.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Shown in place of a field the service left out.
pub const PLACEHOLDER: &str = "...";

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Prose summary for people
    Summary,
    /// Copyable prompt for an image model
    Prompt,
    Detail,
}

#[derive(Debug, PartialEq)]
pub struct BriefField {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, PartialEq)]
pub struct BriefSchema {
    pub name: &'static str,
    pub fields: &'static [BriefField],
}

const HUMAN_VISION: BriefField = BriefField {
    name: "human_vision",
    label: "Visual concept",
    description: "Summary of the image concept for people. Mention placeholders for text.",
    kind: FieldKind::Summary,
};

const AI_PROMPT: BriefField = BriefField {
    name: "ai_prompt",
    label: "AI prompt (copy & paste)",
    description: "English prompt for an image model. Photorealistic, clean, with negative space for text.",
    kind: FieldKind::Prompt,
};

pub static STANDARD_BRIEF: BriefSchema = BriefSchema {
    name: "standard",
    fields: &[HUMAN_VISION, AI_PROMPT],
};

pub static DETAILED_BRIEF: BriefSchema = BriefSchema {
    name: "detailed",
    fields: &[
        HUMAN_VISION,
        BriefField {
            name: "category",
            label: "Category",
            description: "The kind of image, e.g. portrait, landscape, still life, abstract.",
            kind: FieldKind::Detail,
        },
        BriefField {
            name: "lighting",
            label: "Lighting",
            description: "Light sources, direction, time of day and color temperature.",
            kind: FieldKind::Detail,
        },
        BriefField {
            name: "camera",
            label: "Camera",
            description: "Lens, angle, framing and depth of field.",
            kind: FieldKind::Detail,
        },
        BriefField {
            name: "style_keywords",
            label: "Style keywords",
            description: "Comma separated style keywords.",
            kind: FieldKind::Detail,
        },
        BriefField {
            name: "negative_space",
            label: "Negative space",
            description: "Where the image leaves room for text and how much.",
            kind: FieldKind::Detail,
        },
        AI_PROMPT,
    ],
};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BriefParseError {
    #[error("Brief is not valid JSON: {0}")]
    NotJson(String),
    #[error("Brief is not a JSON object")]
    NotObject,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct BriefEntry {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: String,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct StyleBrief {
    pub fields: Vec<BriefEntry>,
}

impl StyleBrief {
    /// Parses the service output against `schema`. Every schema field
    /// ends up populated; missing ones get the placeholder.
    pub fn parse(schema: &BriefSchema, raw: &str) -> Result<Self, BriefParseError> {
        let value: Value = serde_json::from_str(strip_code_fence(raw))
            .map_err(|e| BriefParseError::NotJson(e.to_string()))?;
        let object = value.as_object().ok_or(BriefParseError::NotObject)?;

        let fields = schema
            .fields
            .iter()
            .map(|field| BriefEntry {
                name: field.name.to_string(),
                label: field.label.to_string(),
                kind: field.kind,
                value: object
                    .get(field.name)
                    .and_then(value_to_text)
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
            })
            .collect();

        Ok(Self { fields })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Plain text rendering for terminals.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for field in self.fields.iter() {
            out.push_str(&field.label.to_uppercase());
            out.push('\n');
            out.push_str(&field.value);
            out.push_str("\n\n");
        }
        out.trim_end().to_string()
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().trim_end_matches("```").trim()
}

fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    };
    if text.is_empty() { None } else { Some(text) }
}
