use std::time::Duration;

use anyhow::{Error, Result};
use async_trait::async_trait;

use super::core::{GenerateContentRequest, generate_content};
use super::retry::{RetryPolicy, retry_with_backoff};
use crate::ai::client::{GenerationClient, GenerationError};
use crate::ai::conversation::{BriefSchema, Transcript};
use crate::core::AppConfig;

/// Talks to a Gemini compatible API, retrying each model with backoff
/// and falling back to the next model in `models` when one fails.
pub struct GeminiClient {
    api_hostname: String,
    api_key: String,
    models: Vec<String>,
    retry_policy: RetryPolicy,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(
        api_hostname: &str,
        api_key: &str,
        models: Vec<String>,
        retry_policy: RetryPolicy,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            models,
            retry_policy,
            http,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(
            &config.llm_api_hostname,
            &config.llm_api_key,
            config.llm_models.clone(),
            config.retry_policy.clone(),
            config.request_timeout,
        )
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn complete(
        &self,
        transcript: &Transcript,
        instruction: &str,
        schema: Option<&BriefSchema>,
    ) -> Result<String, GenerationError> {
        if self.models.is_empty() {
            tracing::error!("No models configured for generation");
            return Err(GenerationError::NoModels);
        }

        let mut request = GenerateContentRequest::new(transcript, instruction);
        if let Some(schema) = schema {
            request = request.with_schema(schema);
        }

        let http = &self.http;
        let api_hostname = self.api_hostname.as_str();
        let api_key = self.api_key.as_str();
        let request = &request;
        let mut attempts = 0;
        let mut last_error = String::new();

        for model in self.models.iter() {
            let model = model.as_str();
            let result = retry_with_backoff(&self.retry_policy, move || {
                generate_content(http, api_hostname, api_key, model, request)
            })
            .await;

            match result {
                Ok(text) => {
                    tracing::debug!("Completion from {} ({} chars)", model, text.len());
                    return Ok(text);
                }
                Err(err) => {
                    attempts += err.attempts;
                    tracing::warn!(
                        "Model {} failed after {} attempt(s): {}",
                        model,
                        err.attempts,
                        err.last
                    );
                    last_error = format!("{}: {}", model, err.last);
                }
            }
        }

        tracing::error!(
            "All {} model(s) failed after {} attempt(s). Last error: {}",
            self.models.len(),
            attempts,
            last_error
        );
        Err(GenerationError::Exhausted {
            attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::conversation::{STANDARD_BRIEF, Turn};
    use mockito::Matcher;
    use serde_json::json;

    const SUCCESS_BODY: &str =
        r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "Got it."}]}}]}"#;

    fn fast_policy(max_attempts: usize) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    fn client(url: &str, models: &[&str], max_attempts: usize) -> GeminiClient {
        GeminiClient::new(
            url,
            "test-key",
            models.iter().map(|m| m.to_string()).collect(),
            fast_policy(max_attempts),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn transcript() -> Transcript {
        Transcript::new_with_turns(vec![
            Turn::system("What is the occasion?"),
            Turn::user("An autumn concert"),
        ])
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("secret".to_string()),
            "VISUAL_LAB_MODELS" => Some("a,b".to_string()),
            _ => None,
        })
        .unwrap();
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.models(), &["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_complete_basic_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/model-a:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SUCCESS_BODY)
            .create_async()
            .await;

        let client = client(&server.url(), &["model-a"], 3);
        let result = client.complete(&transcript(), "Be direct.", None).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "Got it.");
    }

    #[tokio::test]
    async fn test_complete_structured_declares_schema() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/model-a:generateContent")
            .match_body(Matcher::PartialJson(json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .with_status(200)
            .with_body(
                r#"{"candidates": [{"content": {"parts": [{"text": "{\"human_vision\": \"x\", \"ai_prompt\": \"y\"}"}]}}]}"#,
            )
            .create_async()
            .await;

        let client = client(&server.url(), &["model-a"], 1);
        let result = client
            .complete(&transcript(), "JSON output only.", Some(&STANDARD_BRIEF))
            .await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), r#"{"human_vision": "x", "ai_prompt": "y"}"#);
    }

    #[tokio::test]
    async fn test_complete_retries_rate_limits() {
        let mut server = mockito::Server::new_async().await;

        // Two rate limited responses followed by a success
        let rate_limited = server
            .mock("POST", "/v1beta/models/model-a:generateContent")
            .with_status(429)
            .expect(2)
            .create_async()
            .await;
        let success = server
            .mock("POST", "/v1beta/models/model-a:generateContent")
            .with_status(200)
            .with_body(SUCCESS_BODY)
            .expect(1)
            .create_async()
            .await;

        let client = client(&server.url(), &["model-a"], 4);
        let result = client.complete(&transcript(), "", None).await;

        rate_limited.assert_async().await;
        success.assert_async().await;
        assert_eq!(result.unwrap(), "Got it.");
    }

    #[tokio::test]
    async fn test_complete_respects_attempt_budget() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/model-a:generateContent")
            .with_status(429)
            .expect(3)
            .create_async()
            .await;

        let client = client(&server.url(), &["model-a"], 3);
        let result = client.complete(&transcript(), "", None).await;

        mock.assert_async().await;
        assert_eq!(
            result.unwrap_err(),
            GenerationError::Exhausted {
                attempts: 3,
                last_error: "model-a: rate limited by the service".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_complete_falls_back_to_next_model() {
        let mut server = mockito::Server::new_async().await;

        // A rejected request is not retried on the same model
        let rejected = server
            .mock("POST", "/v1beta/models/model-a:generateContent")
            .with_status(404)
            .with_body(r#"{"error": {"code": 404, "message": "model not found", "status": "NOT_FOUND"}}"#)
            .expect(1)
            .create_async()
            .await;
        let fallback = server
            .mock("POST", "/v1beta/models/model-b:generateContent")
            .with_status(200)
            .with_body(SUCCESS_BODY)
            .expect(1)
            .create_async()
            .await;

        let client = client(&server.url(), &["model-a", "model-b"], 4);
        let result = client.complete(&transcript(), "", None).await;

        rejected.assert_async().await;
        fallback.assert_async().await;
        assert_eq!(result.unwrap(), "Got it.");
    }

    #[tokio::test]
    async fn test_complete_exhausts_fallback_chain() {
        let mut server = mockito::Server::new_async().await;
        let model_a = server
            .mock("POST", "/v1beta/models/model-a:generateContent")
            .with_status(503)
            .expect(2)
            .create_async()
            .await;
        let model_b = server
            .mock("POST", "/v1beta/models/model-b:generateContent")
            .with_status(503)
            .expect(2)
            .create_async()
            .await;

        let client = client(&server.url(), &["model-a", "model-b"], 2);
        let result = client.complete(&transcript(), "", None).await;

        model_a.assert_async().await;
        model_b.assert_async().await;
        let err = result.unwrap_err();
        assert!(matches!(err, GenerationError::Exhausted { attempts: 4, .. }));
        assert_eq!(err.to_string(), crate::ai::client::FAILURE_MARKER);
    }

    #[tokio::test]
    async fn test_complete_transport_errors_become_failure() {
        // Nothing listens on port 1 so every attempt fails to connect
        let client = client("http://127.0.0.1:1", &["model-a"], 2);
        let result = client.complete(&transcript(), "", None).await;

        assert!(matches!(
            result,
            Err(GenerationError::Exhausted { attempts: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_complete_without_models() {
        let client = client("http://127.0.0.1:1", &[], 2);
        let result = client.complete(&transcript(), "", None).await;
        assert_eq!(result.unwrap_err(), GenerationError::NoModels);
    }

    fn slow_body(w: &mut dyn std::io::Write) -> std::io::Result<()> {
        std::thread::sleep(Duration::from_millis(300));
        w.write_all(SUCCESS_BODY.as_bytes())
    }

    fn impatient_client(url: &str, max_attempts: usize) -> GeminiClient {
        GeminiClient::new(
            url,
            "test-key",
            vec!["model-a".to_string()],
            fast_policy(max_attempts),
            Duration::from_millis(50),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_retries_timed_out_attempts() {
        let mut server = mockito::Server::new_async().await;

        // The first response stalls past the client timeout
        let slow = server
            .mock("POST", "/v1beta/models/model-a:generateContent")
            .with_status(200)
            .with_chunked_body(slow_body)
            .expect(1)
            .create_async()
            .await;
        let success = server
            .mock("POST", "/v1beta/models/model-a:generateContent")
            .with_status(200)
            .with_body(SUCCESS_BODY)
            .expect(1)
            .create_async()
            .await;

        let client = impatient_client(&server.url(), 3);
        let result = client.complete(&transcript(), "", None).await;

        slow.assert_async().await;
        success.assert_async().await;
        assert_eq!(result.unwrap(), "Got it.");
    }

    #[tokio::test]
    async fn test_complete_timeouts_are_transport_errors() {
        let mut server = mockito::Server::new_async().await;
        let slow = server
            .mock("POST", "/v1beta/models/model-a:generateContent")
            .with_status(200)
            .with_chunked_body(slow_body)
            .expect(2)
            .create_async()
            .await;

        let client = impatient_client(&server.url(), 2);
        let result = client.complete(&transcript(), "", None).await;

        slow.assert_async().await;
        match result {
            Err(GenerationError::Exhausted {
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, 2);
                assert!(last_error.starts_with("model-a: transport error"));
            }
            other => panic!("Expected exhausted, got {:?}", other),
        }
    }
}
