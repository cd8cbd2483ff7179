use handlebars::Handlebars;

use super::brief::StyleBrief;
use super::error::ConversationError;
use super::models::{SessionState, Turn};
use super::presets::Mode;
use crate::ai::client::SharedGenerationClient;
use crate::ai::prompt::{self, EXTRACTION_SYSTEM_INSTRUCTION};
use crate::core::config::DEFAULT_TURN_THRESHOLD;

/// Drives a guided conversation: picks the welcome turn for a mode,
/// forwards user input to the generation client and turns a finished
/// transcript into a `StyleBrief`.
///
/// The driver is stateless with respect to sessions. Every operation
/// takes the `SessionState` it works on, so one driver can be shared by
/// any number of sessions.
pub struct Conversation {
    client: SharedGenerationClient,
    threshold: usize,
    templates: Handlebars<'static>,
    html_templates: Handlebars<'static>,
}

impl Conversation {
    pub fn new(client: SharedGenerationClient) -> Self {
        Self {
            client,
            threshold: DEFAULT_TURN_THRESHOLD,
            templates: prompt::templates(),
            html_templates: prompt::html_templates(),
        }
    }

    /// Transcript length at which a session counts as finished.
    pub fn threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the mode and adds the mode's welcome turn.
    pub fn start(&self, session: &mut SessionState, mode: Mode) -> Result<(), ConversationError> {
        if session.is_started() || !session.transcript.is_empty() {
            return Err(ConversationError::AlreadyStarted);
        }

        session.mode = Some(mode);
        session.transcript.push(Turn::system(mode.preset().welcome));
        session.finished = session.transcript.len() >= self.threshold;
        tracing::debug!("Started session in mode {}", mode);
        Ok(())
    }

    pub fn start_named(
        &self,
        session: &mut SessionState,
        mode: &str,
    ) -> Result<(), ConversationError> {
        let mode = mode.parse::<Mode>()?;
        self.start(session, mode)
    }

    /// Sends the user's message and appends it together with the reply.
    /// When the service fails the transcript is left as it was so the
    /// same message can be sent again.
    pub async fn submit(
        &self,
        session: &mut SessionState,
        text: &str,
    ) -> Result<String, ConversationError> {
        let mode = session.mode.ok_or(ConversationError::NotStarted)?;
        if session.finished {
            return Err(ConversationError::Finished);
        }
        if text.trim().is_empty() {
            return Err(ConversationError::EmptyInput);
        }

        let instruction = prompt::system_instruction(&self.templates, mode.preset())?;
        let mut pending = session.transcript.clone();
        pending.push(Turn::user(text));

        let reply = self
            .client
            .complete(&pending, &instruction, None)
            .await
            .inspect_err(|e| tracing::error!("Submit failed in mode {}: {:?}", mode, e))?;

        pending.push(Turn::system(&reply));
        session.transcript = pending;
        session.finished = session.transcript.len() >= self.threshold;
        if session.finished {
            tracing::debug!(
                "Session finished after {} turns",
                session.transcript.len()
            );
        }

        Ok(reply)
    }

    /// Asks the service to summarize a finished session into the mode's
    /// brief schema. The extraction request is not added to the
    /// session's transcript.
    pub async fn extract_brief(
        &self,
        session: &SessionState,
    ) -> Result<StyleBrief, ConversationError> {
        let mode = session.mode.ok_or(ConversationError::NotStarted)?;
        if !session.finished {
            return Err(ConversationError::NotFinished);
        }

        let schema = mode.preset().schema;
        let instruction = prompt::extraction_instruction(&self.templates, schema)?;
        let mut pending = session.transcript.clone();
        pending.push(Turn::user(&instruction));

        let raw = self
            .client
            .complete(&pending, EXTRACTION_SYSTEM_INSTRUCTION, Some(schema))
            .await?;

        StyleBrief::parse(schema, &raw).map_err(|e| {
            tracing::error!("Failed to parse brief: {} - Response: {}", e, raw);
            ConversationError::from(e)
        })
    }

    /// HTML fragment with the brief's prose and a copyable prompt block.
    pub fn render_brief_html(&self, brief: &StyleBrief) -> Result<String, ConversationError> {
        Ok(prompt::brief_html(&self.html_templates, brief)?)
    }
}
