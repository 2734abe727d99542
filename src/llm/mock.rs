use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatCompletionRequest, ChatCompletionResponse, LlmClient, LlmError};

#[derive(Debug, Default)]
pub struct MockClient {
    responses: Mutex<VecDeque<Result<ChatCompletionResponse, LlmError>>>,
    calls: Mutex<Vec<ChatCompletionRequest>>,
}

impl MockClient {
    pub fn new() -> Self { Self::default() }

    pub fn push_text(&self, content: &str) {
        self.push_response(Ok(ChatCompletionResponse { content: content.to_string(), model: None, total_tokens: None }));
    }

    pub fn push_response(&self, resp: Result<ChatCompletionResponse, LlmError>) {
        self.responses.lock().unwrap().push_back(resp);
    }

    pub fn calls(&self) -> Vec<ChatCompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockClient {
    async fn chat_completion(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse, LlmError> {
        self.calls.lock().unwrap().push(request);
        self.responses.lock().unwrap().pop_front().unwrap_or(Err(LlmError::MockQueueEmpty))
    }
}
