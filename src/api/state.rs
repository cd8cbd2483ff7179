use std::collections::HashMap;
use std::sync::Arc;

use crate::ai::conversation::{Conversation, SessionState};

/// A session plus a revision that changes on every write. Handlers that
/// await the service check the revision before writing back so they
/// never overwrite a reset or restart that happened in the meantime.
#[derive(Clone, Default)]
pub struct StoredSession {
    pub revision: u64,
    pub state: SessionState,
}

impl StoredSession {
    pub fn new(state: SessionState) -> Self {
        Self { revision: 0, state }
    }

    pub fn replace(&mut self, state: SessionState) {
        self.state = state;
        self.revision += 1;
    }
}

pub struct AppState {
    // In memory sessions keyed by session ID. Nothing is persisted.
    pub sessions: HashMap<String, StoredSession>,
    pub conversation: Arc<Conversation>,
}

impl AppState {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            sessions: HashMap::new(),
            conversation: Arc::new(conversation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_bumps_revision() {
        let mut stored = StoredSession::new(SessionState::new());
        assert_eq!(stored.revision, 0);

        stored.replace(SessionState::new());
        stored.replace(SessionState::new());
        assert_eq!(stored.revision, 2);
    }
}
