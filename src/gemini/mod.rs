//! Client for the Gemini `generateContent` API.

mod client;
mod core;
pub mod retry;

pub use client::GeminiClient;
pub use self::core::*;
pub use retry::{RetryPolicy, Retryable, retry_with_backoff};
