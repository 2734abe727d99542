use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::{
    ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse, LlmClient, LlmConfig, LlmError,
};

/// Client for `/chat/completions` on OpenAI or any compatible server.
#[derive(Clone)]
pub struct OpenAiClient {
    http: HttpClient,
    cfg: LlmConfig,
}

impl OpenAiClient {
    pub fn new(cfg: LlmConfig) -> Result<Self, LlmError> {
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(LlmError::from_reqwest)?;
        Ok(Self { http, cfg })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.cfg.base_url.trim_end_matches('/'))
    }

    fn build_api_request(&self, req: &ChatCompletionRequest) -> ApiChatCompletionRequest {
        ApiChatCompletionRequest {
            model: req.model.clone().unwrap_or_else(|| self.cfg.default_model.clone()),
            temperature: req.temperature,
            max_tokens: req.max_tokens,
            messages: req
                .messages
                .iter()
                .map(|m| ApiChatMessage { role: m.role.as_api_str().to_string(), content: Some(m.content.clone()) })
                .collect(),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse, LlmError> {
        if request.messages.is_empty() {
            return Err(LlmError::EmptyMessages);
        }

        let mut call = self.http.post(self.endpoint()).json(&self.build_api_request(&request));
        if let Some(key) = &self.cfg.api_key {
            call = call.bearer_auth(key);
        }

        let response = call.send().await.map_err(LlmError::from_reqwest)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(LlmError::from_reqwest)?;

        if !status.is_success() {
            let error = serde_json::from_slice::<ApiErrorEnvelope>(&bytes).ok().map(|env| env.error);
            return Err(LlmError::Api { status, error: error.unwrap_or_default() });
        }

        parse_completion(&bytes)
    }
}

fn parse_completion(bytes: &[u8]) -> Result<ChatCompletionResponse, LlmError> {
    let parsed: ApiChatCompletionResponse = serde_json::from_slice(bytes).map_err(LlmError::Decode)?;
    let content = parsed
        .choices
        .iter()
        .find_map(|choice| choice.message.content.clone())
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(LlmError::EmptyCompletion)?;
    Ok(ChatCompletionResponse {
        content,
        model: parsed.model,
        total_tokens: parsed.usage.and_then(|u| u.total_tokens),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize)]
struct ApiChatCompletionRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    messages: Vec<ApiChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ApiChatChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiChatChoice {
    message: ApiChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiUsage {
    total_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::llm::ChatMessage;

    fn client() -> OpenAiClient {
        OpenAiClient::new(LlmConfig {
            api_key: Some("test".into()),
            base_url: "https://api.openai.com/v1/".into(),
            default_model: "gpt-4o-mini".into(),
            timeout: Duration::from_secs(30),
        })
        .unwrap()
    }

    #[test]
    fn build_request_serializes_messages() {
        let request = ChatCompletionRequest {
            model: None,
            messages: vec![ChatMessage::system("You are helpful."), ChatMessage::user("Hello")],
            max_tokens: Some(100),
            temperature: Some(0.7),
        };
        let value = serde_json::to_value(client().build_api_request(&request)).unwrap();

        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "Hello");
        assert_eq!(value["max_tokens"], 100);
        assert!((value["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        assert_eq!(client().endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn parse_completion_takes_first_message() {
        let body = br#"{"model":"gpt-4o-mini","choices":[{"message":{"role":"assistant","content":"  Hi there \n"}}],"usage":{"total_tokens":12}}"#;
        let resp = parse_completion(body).unwrap();
        assert_eq!(resp.content, "Hi there");
        assert_eq!(resp.total_tokens, Some(12));
    }

    #[test]
    fn parse_completion_rejects_empty_or_malformed() {
        let empty = br#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert!(matches!(parse_completion(empty), Err(LlmError::EmptyCompletion)));
        assert!(matches!(parse_completion(b"not json"), Err(LlmError::Decode(_))));
    }

    #[tokio::test]
    async fn empty_messages_fail_before_any_request() {
        let req = ChatCompletionRequest { model: None, messages: vec![], max_tokens: None, temperature: None };
        assert!(matches!(client().chat_completion(req).await, Err(LlmError::EmptyMessages)));
    }
}
