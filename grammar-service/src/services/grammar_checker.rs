//! One grammar check: build the request, make the single bounded call, parse.

use crate::config::{CheckConfig, ResponseFormat};
use crate::models::GrammarCheckResult;
use crate::services::parser::{self, ParseError};
use crate::services::prompt;
use crate::services::providers::{CompletionProvider, ProviderError};
use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failure of a grammar check, as seen by the HTTP handler.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Completion call failed: {0}")]
    UpstreamCall(ProviderError),

    #[error("Completion call timed out after {0:?}")]
    UpstreamTimeout(Duration),

    #[error("Completion response could not be parsed: {0}")]
    UpstreamParse(#[from] ParseError),
}

impl CheckError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CheckError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CheckError::UpstreamCall(_) | CheckError::UpstreamParse(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to show to the user. Details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            CheckError::UpstreamParse(_) => "Oops! Something went wrong. Please try again.",
            CheckError::UpstreamTimeout(_) => {
                "The grammar checker took too long to answer. Please try again."
            }
            CheckError::UpstreamCall(ProviderError::RateLimited) => {
                "The grammar checker is busy right now. Please try again in a moment."
            }
            CheckError::UpstreamCall(_) => {
                "We could not reach the grammar checker. Please try again later."
            }
        }
    }
}

/// Grades text through a [`CompletionProvider`].
pub struct GrammarChecker {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    format: ResponseFormat,
    timeout: Duration,
}

impl GrammarChecker {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &CheckConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            format: config.response_format,
            timeout: config.request_timeout(),
        }
    }

    /// Check `text` and return its score, changes and reasons.
    #[tracing::instrument(
        name = "grammar_check",
        skip_all,
        fields(format = %self.format, model = %self.model, text_len = text.len())
    )]
    pub async fn check(&self, text: &str) -> Result<GrammarCheckResult, CheckError> {
        let request = prompt::build_request(self.format, &self.model, text);

        let response = match tokio::time::timeout(self.timeout, self.provider.complete(&request))
            .await
        {
            Err(_) | Ok(Err(ProviderError::Timeout)) => {
                return Err(CheckError::UpstreamTimeout(self.timeout));
            }
            Ok(Err(ProviderError::InvalidResponse(msg))) => {
                return Err(ParseError::MalformedBody(msg).into());
            }
            Ok(Err(e)) => return Err(CheckError::UpstreamCall(e)),
            Ok(Ok(response)) => response,
        };

        let result = parser::parse_response(self.format, &response)?;

        tracing::info!(
            score = result.score.value(),
            changes = result.changes.len(),
            reasons = result.reasons.len(),
            "Grammar check completed"
        );

        Ok(result)
    }

    pub async fn health_check(&self) -> Result<(), ProviderError> {
        self.provider.health_check().await
    }
}
