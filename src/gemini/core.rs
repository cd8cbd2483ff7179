use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use super::retry::Retryable;
use crate::ai::conversation::{Author, BriefSchema, Transcript};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "model")]
    Model,
}

impl From<Author> for Role {
    fn from(author: Author) -> Self {
        match author {
            Author::User => Role::User,
            Author::System => Role::Model,
        }
    }
}

#[derive(Clone, Serialize, Debug)]
pub struct Part {
    pub text: String,
}

#[derive(Clone, Serialize, Debug)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: Option<Role>, text: &str) -> Self {
        Self {
            role,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Clone, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

// {
//     "contents": [{"role": "model", "parts": [{"text": "..."}]}, ...],
//     "systemInstruction": {"parts": [{"text": "..."}]},
//     "generationConfig": {"responseMimeType": "application/json", ...}
// }
#[derive(Clone, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    pub fn new(transcript: &Transcript, instruction: &str) -> Self {
        let contents = transcript
            .iter()
            .map(|turn| Content::new(Some(turn.author.into()), &turn.text))
            .collect();
        let system_instruction = if instruction.trim().is_empty() {
            None
        } else {
            Some(Content::new(None, instruction))
        };

        Self {
            contents,
            system_instruction,
            generation_config: None,
        }
    }

    /// Constrain the output to a JSON object with one string property
    /// per schema field.
    pub fn with_schema(mut self, schema: &BriefSchema) -> Self {
        self.generation_config = Some(GenerationConfig {
            response_mime_type: String::from("application/json"),
            response_schema: response_schema(schema),
        });
        self
    }
}

fn response_schema(schema: &BriefSchema) -> Value {
    let mut properties = serde_json::Map::new();
    for field in schema.fields {
        properties.insert(
            field.name.to_string(),
            json!({"type": "STRING", "description": field.description}),
        );
    }
    let names: Vec<&str> = schema.fields.iter().map(|f| f.name).collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": names,
        "propertyOrdering": names,
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Failure of a single request to the service.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("rate limited by the service")]
    RateLimited,
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream error {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("request rejected {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl Retryable for AttemptError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            AttemptError::RateLimited | AttemptError::Transport(_) | AttemptError::Upstream { .. }
        )
    }
}

/// Makes one `generateContent` call against `model` and returns the text
/// of the first candidate.
pub async fn generate_content(
    client: &reqwest::Client,
    api_hostname: &str,
    api_key: &str,
    model: &str,
    request: &GenerateContentRequest,
) -> Result<String, AttemptError> {
    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        api_hostname.trim_end_matches('/'),
        model
    );
    let response = client
        .post(url)
        .header("x-goog-api-key", api_key)
        .json(request)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AttemptError::RateLimited);
    }
    if status.is_server_error() {
        return Err(AttemptError::Upstream {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    if !status.is_success() {
        return Err(AttemptError::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    let parsed: GenerateContentResponse = serde_json::from_str(&body)
        .map_err(|e| AttemptError::Malformed(format!("{}: {}", e, body)))?;

    parsed
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| AttemptError::Malformed(format!("No candidate text in: {}", body)))
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            match wrapper.error.status {
                Some(status) if !status.is_empty() => format!("{}: {}", status, msg),
                _ => msg,
            }
        })
        .unwrap_or_else(|_| body.to_string())
}
