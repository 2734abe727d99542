//! Chat-completion clients used by the listing generator.

pub mod openai;
#[cfg(test)]
pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

pub use openai::OpenAiClient;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:11434/v1";
const DEFAULT_LOCAL_MODEL: &str = "llama3.2";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for an OpenAI-compatible chat endpoint.
#[derive(Clone, Debug)]
pub struct LlmConfig {
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Hosted OpenAI: OPENAI_API_KEY, OPENAI_MODEL, OPENAI_BASE_URL, OPENAI_TIMEOUT_SECS.
    pub fn openai_from_env() -> Self {
        Self {
            api_key: env_nonempty("OPENAI_API_KEY"),
            base_url: env_nonempty("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            default_model: env_nonempty("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            timeout: env_timeout("OPENAI_TIMEOUT_SECS"),
        }
    }

    /// A model served on this machine behind an OpenAI-compatible API
    /// (ollama, llama.cpp server, vLLM). The key is optional.
    pub fn local_from_env() -> Self {
        Self {
            api_key: env_nonempty("LOCAL_LLM_API_KEY"),
            base_url: env_nonempty("LOCAL_LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LOCAL_BASE_URL.to_string()),
            default_model: env_nonempty("LOCAL_LLM_MODEL").unwrap_or_else(|| DEFAULT_LOCAL_MODEL.to_string()),
            timeout: env_timeout("LOCAL_LLM_TIMEOUT_SECS"),
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_timeout(key: &str) -> Duration {
    let secs = std::env::var(key).ok().and_then(|v| v.parse::<u64>().ok()).unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat_completion(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse, LlmError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChatRole {
    System,
    User,
}

impl ChatRole {
    pub(crate) fn as_api_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
        }
    }
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self { Self { role: ChatRole::System, content: content.into() } }
    pub fn user(content: impl Into<String>) -> Self { Self { role: ChatRole::User, content: content.into() } }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatCompletionResponse {
    pub content: String,
    pub model: Option<String>,
    pub total_tokens: Option<u32>,
}

#[derive(Debug)]
pub enum LlmError {
    EmptyMessages,
    Http(reqwest::Error),
    Timeout,
    Api { status: StatusCode, error: ApiErrorBody },
    Decode(serde_json::Error),
    /// The response parsed but carried no message text.
    EmptyCompletion,
    #[cfg(test)]
    MockQueueEmpty,
}

impl LlmError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() { LlmError::Timeout } else { LlmError::Http(err) }
    }
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::EmptyMessages => write!(f, "chat completion requires at least one message"),
            LlmError::Http(err) => write!(f, "http error: {err}"),
            LlmError::Timeout => write!(f, "request timed out"),
            LlmError::Api { status, error } => write!(f, "api error {status}: {}", error.message),
            LlmError::Decode(err) => write!(f, "decode error: {err}"),
            LlmError::EmptyCompletion => write!(f, "completion contained no text"),
            #[cfg(test)]
            LlmError::MockQueueEmpty => write!(f, "mock client response queue is empty"),
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LlmError::Http(err) => Some(err),
            LlmError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl Default for ApiErrorBody {
    fn default() -> Self {
        Self { message: "unknown error".to_string(), r#type: None, code: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status() {
        let err = LlmError::Api {
            status: StatusCode::UNAUTHORIZED,
            error: ApiErrorBody { message: "bad key".into(), r#type: Some("invalid_request_error".into()), code: None },
        };
        assert_eq!(format!("{err}"), "api error 401 Unauthorized: bad key");
    }

    #[test]
    fn message_constructors_set_roles() {
        assert_eq!(ChatMessage::system("s").role.as_api_str(), "system");
        assert_eq!(ChatMessage::user("u").role.as_api_str(), "user");
    }
}
