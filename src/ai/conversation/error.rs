use thiserror::Error;

use super::brief::BriefParseError;
use crate::ai::client::GenerationError;

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("Unknown mode: {0}")]
    UnknownMode(String),
    #[error("Session has already been started")]
    AlreadyStarted,
    #[error("Session has not been started")]
    NotStarted,
    #[error("Session is finished, reset it to start over")]
    Finished,
    #[error("Session is not finished yet")]
    NotFinished,
    #[error("Message can not be empty")]
    EmptyInput,
    #[error(transparent)]
    Service(#[from] GenerationError),
    #[error(transparent)]
    Parse(#[from] BriefParseError),
    #[error("Failed to render template: {0}")]
    Template(#[from] handlebars::RenderError),
}
