//! Public types for the sessions API
use serde::{Deserialize, Serialize};

use crate::ai::conversation::{BriefEntry, Mode, SessionState, Turn};

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    // Parsed by the handler so unknown modes get a descriptive error
    pub mode: String,
}

#[derive(Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub id: String,
    pub mode: Option<Mode>,
    pub finished: bool,
    pub transcript: Vec<Turn>,
}

impl SessionResponse {
    pub fn new(id: &str, session: &SessionState) -> Self {
        Self {
            id: id.to_string(),
            mode: session.mode,
            finished: session.finished,
            transcript: session.transcript.turns().to_vec(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub reply: String,
    pub session: SessionResponse,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BriefResponse {
    pub fields: Vec<BriefEntry>,
    pub html: String,
    pub text: String,
}
