//! Guided conversations that end in a structured style brief.

mod brief;
mod core;
mod error;
mod models;
mod presets;

pub use self::brief::*;
pub use self::core::Conversation;
pub use self::error::ConversationError;
pub use self::models::*;
pub use self::presets::{Mode, PRESETS, Preset};
