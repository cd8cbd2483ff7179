pub mod client;
pub mod conversation;
pub mod prompt;
