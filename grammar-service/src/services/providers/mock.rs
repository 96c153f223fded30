//! Mock provider implementation for testing.

use super::{
    ChatCompletionRequest, ChatCompletionResponse, CompletionProvider, FunctionCall,
    ProviderError, ResponseMessage,
};
use crate::services::prompt::GRAMMAR_FUNCTION_NAME;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Mock completion provider that replays a canned outcome and records every
/// request it receives.
pub struct MockCompletionProvider {
    enabled: bool,
    outcome: Result<ChatCompletionResponse, ProviderError>,
    delay: Option<Duration>,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl MockCompletionProvider {
    pub fn new(outcome: Result<ChatCompletionResponse, ProviderError>) -> Self {
        Self {
            enabled: true,
            outcome,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer with a `log_grammar_check` function call carrying `arguments`.
    pub fn function_call(arguments: impl Into<String>) -> Self {
        Self::new(Ok(ChatCompletionResponse::from_message(ResponseMessage {
            role: Some("assistant".to_string()),
            content: None,
            function_call: Some(FunctionCall {
                name: GRAMMAR_FUNCTION_NAME.to_string(),
                arguments: arguments.into(),
            }),
        })))
    }

    /// Answer with plain message content.
    pub fn content(content: impl Into<String>) -> Self {
        Self::new(Ok(ChatCompletionResponse::from_message(ResponseMessage {
            role: Some("assistant".to_string()),
            content: Some(content.into()),
            function_call: None,
        })))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::new(Err(error))
    }

    /// A provider that reports itself as not configured.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::failing(ProviderError::NotConfigured(
                "Mock completion provider not enabled".to_string(),
            ))
        }
    }

    /// Sleep before answering, to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.outcome.clone()
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock completion provider not enabled".to_string(),
            ))
        }
    }
}
