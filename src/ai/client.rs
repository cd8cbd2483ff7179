//! The boundary between the conversation driver and whatever service
//! generates text.

use async_trait::async_trait;
use thiserror::Error;

use crate::ai::conversation::{BriefSchema, Transcript};

/// User facing text shown when the service could not produce a reply.
pub const FAILURE_MARKER: &str = "Connection failed. Please try again.";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    /// Every model in the fallback chain failed. `last_error` describes
    /// the final failure and is meant for logs, not users.
    #[error("{}", FAILURE_MARKER)]
    Exhausted { attempts: usize, last_error: String },
    #[error("{} (no models configured)", FAILURE_MARKER)]
    NoModels,
}

#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Produces the next turn for `transcript`. When `schema` is set the
    /// service is asked for a JSON object with exactly those fields.
    ///
    /// Implementations never panic on service failures; everything is
    /// reported as a `GenerationError`.
    async fn complete(
        &self,
        transcript: &Transcript,
        instruction: &str,
        schema: Option<&BriefSchema>,
    ) -> Result<String, GenerationError>;
}

pub type SharedGenerationClient = std::sync::Arc<dyn GenerationClient>;
