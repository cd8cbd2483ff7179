use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::gemini::RetryPolicy;

pub const DEFAULT_LLM_HOST: &str = "https://generativelanguage.googleapis.com";

/// Preference ordered fallback chain used when `VISUAL_LAB_MODELS` is
/// not set.
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-1.5-pro-latest",
    "gemini-2.0-flash-lite-preview-02-05",
    "gemini-2.0-flash-exp",
    "gemini-2.0-flash",
    "gemini-flash-latest",
];

/// Transcript length at which a session is considered finished: the
/// welcome turn plus four answer/reply pairs.
pub const DEFAULT_TURN_THRESHOLD: usize = 9;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing env var {0}")]
    MissingCredential(&'static str),
    #[error("Invalid value for env var {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm_api_hostname: String,
    pub llm_api_key: String,
    pub llm_models: Vec<String>,
    pub turn_threshold: usize,
    pub retry_policy: RetryPolicy,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Reads the configuration from the process environment. A missing
    /// API key is fatal.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm_api_key = lookup("GEMINI_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingCredential("GEMINI_API_KEY"))?;
        let llm_api_hostname =
            lookup("VISUAL_LAB_LLM_HOST").unwrap_or_else(|| DEFAULT_LLM_HOST.to_string());
        let llm_models = match lookup("VISUAL_LAB_MODELS") {
            Some(models) => models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
        };
        let turn_threshold =
            parse_var(&lookup, "VISUAL_LAB_TURN_THRESHOLD", DEFAULT_TURN_THRESHOLD)?;
        if turn_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                var: "VISUAL_LAB_TURN_THRESHOLD",
                value: turn_threshold.to_string(),
            });
        }

        let defaults = RetryPolicy::default();
        let max_attempts = parse_var(&lookup, "VISUAL_LAB_MAX_ATTEMPTS", defaults.max_attempts)?;
        let base_delay_ms = parse_var(
            &lookup,
            "VISUAL_LAB_RETRY_BASE_MS",
            defaults.base_delay.as_millis() as u64,
        )?;
        let max_delay_ms = parse_var(
            &lookup,
            "VISUAL_LAB_RETRY_MAX_MS",
            defaults.max_delay.as_millis() as u64,
        )?;
        let timeout_secs = parse_var(&lookup, "VISUAL_LAB_REQUEST_TIMEOUT_SECS", 40u64)?;

        Ok(Self {
            llm_api_hostname,
            llm_api_key,
            llm_models,
            turn_threshold,
            retry_policy: RetryPolicy {
                max_attempts: max_attempts.max(1),
                base_delay: Duration::from_millis(base_delay_ms),
                max_delay: Duration::from_millis(max_delay_ms),
            },
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        None => Ok(default),
    }
}
