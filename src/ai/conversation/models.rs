//! The session model for a guided conversation.
use serde::{Deserialize, Serialize};

use super::presets::Mode;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    System,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Turn {
    pub author: Author,
    pub text: String,
}

impl Turn {
    pub fn new(author: Author, text: &str) -> Self {
        Self {
            author,
            text: text.to_string(),
        }
    }

    pub fn user(text: &str) -> Self {
        Self::new(Author::User, text)
    }

    pub fn system(text: &str) -> Self {
        Self::new(Author::System, text)
    }
}

#[derive(Clone, Default, Serialize, Deserialize, Debug, PartialEq)]
#[serde(transparent)]
pub struct Transcript(Vec<Turn>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn new_with_turns(turns: Vec<Turn>) -> Self {
        Self(turns)
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    pub fn push(&mut self, turn: Turn) {
        self.0.push(turn)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.0.iter()
    }
}

/// Everything that belongs to one user's conversation. The driver takes
/// it explicitly on every call, nothing is kept globally.
#[derive(Clone, Default, Serialize, Debug, PartialEq)]
pub struct SessionState {
    pub transcript: Transcript,
    pub mode: Option<Mode>,
    pub finished: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_started(&self) -> bool {
        self.mode.is_some()
    }

    /// Back to the initial state: no turns, no mode, not finished.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_serialization() {
        assert_eq!(serde_json::to_string(&Author::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Author::System).unwrap(), "\"system\"");
    }

    #[test]
    fn test_transcript_serializes_as_list() {
        let transcript = Transcript::new_with_turns(vec![Turn::system("Hi"), Turn::user("Hello")]);
        let value = serde_json::to_value(&transcript).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"author": "system", "text": "Hi"},
                {"author": "user", "text": "Hello"}
            ])
        );
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut session = SessionState {
            transcript: Transcript::new_with_turns(vec![Turn::system("Hi")]),
            mode: Some(Mode::Brainstorming),
            finished: true,
        };
        session.reset();

        assert_eq!(session, SessionState::new());
        assert!(session.transcript.is_empty());
        assert!(session.mode.is_none());
        assert!(!session.is_finished());
    }
}
