//! Test utilities for integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::Request,
};
use serde_json::Value;

use visual_lab::ai::client::{GenerationClient, GenerationError};
use visual_lab::ai::conversation::{BriefSchema, Conversation, Transcript};
use visual_lab::api::AppState;
use visual_lab::api::app;

/// Replays canned responses in order, then falls back to a generic
/// follow-up question.
pub struct StubClient {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    delay: Duration,
}

impl StubClient {
    pub fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            delay: Duration::ZERO,
        }
    }

    /// Waits this long before answering each call.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl GenerationClient for StubClient {
    async fn complete(
        &self,
        _transcript: &Transcript,
        _instruction: &str,
        _schema: Option<&BriefSchema>,
    ) -> Result<String, GenerationError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Tell me more.".to_string()))
    }
}

pub fn exhausted() -> GenerationError {
    GenerationError::Exhausted {
        attempts: 4,
        last_error: "gemini-flash-latest: rate limited by the service".to_string(),
    }
}

/// Creates a test application router backed by a stubbed generation
/// client.
pub fn test_app(responses: Vec<Result<String, GenerationError>>, threshold: usize) -> Router {
    test_app_with_client(StubClient::new(responses), threshold)
}

pub fn test_app_with_client(client: StubClient, threshold: usize) -> Router {
    let conversation = Conversation::new(Arc::new(client)).threshold(threshold);
    app(Arc::new(RwLock::new(AppState::new(conversation))))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}

pub async fn body_to_json(body: Body) -> Value {
    serde_json::from_str(&body_to_string(body).await).expect("Body is not JSON")
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .body(Body::empty())
        .unwrap()
}
