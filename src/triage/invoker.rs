//! Analysis invocation
//!
//! `AnalysisInvoker` is the seam between the deterministic engine and the
//! non-deterministic text-generation service. One call is one attempt: there
//! are no retries here, failures go straight to the fallback policy.

use crate::llm::provider::{
    CompletionRequest, JsonSchemaDefinition, LlmError, LlmProvider, Message, MessageRole,
    ResponseFormat, ToolDescription,
};
use crate::triage::prompt::{PromptText, SYSTEM_PROMPT};
use crate::triage::schema::{TriageDecision, TRIAGE_SCHEMA_NAME};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default bound on a single invocation
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Unvalidated text returned by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText(String);

impl RawText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RawText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why an invocation produced no usable text
#[derive(Debug, Clone, Error)]
pub enum InvocationError {
    #[error("Text-generation provider failed: {0}")]
    Provider(#[from] LlmError),

    #[error("Text-generation call timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("Text-generation service returned an empty response")]
    EmptyResponse,
}

/// Sends a compiled prompt out and returns raw text
#[async_trait]
pub trait AnalysisInvoker: Send + Sync {
    async fn invoke(&self, prompt: &PromptText) -> Result<RawText, InvocationError>;
}

/// Invoker backed by an `LlmProvider`
pub struct LlmInvoker {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmInvoker {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.1, // Low temperature for consistent triage
            max_tokens: 500,
            timeout: DEFAULT_INVOCATION_TIMEOUT,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn is_openai_provider(&self) -> bool {
        self.provider.name() == "openai"
    }

    fn is_anthropic_provider(&self) -> bool {
        self.provider.name() == "anthropic"
    }

    /// Build completion request with provider-specific structured output
    fn build_completion_request(&self, prompt: &PromptText) -> CompletionRequest {
        let mut request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: MessageRole::System,
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: MessageRole::User,
                    content: prompt.as_str().to_string(),
                },
            ],
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            tools: None,
            tool_choice: None,
            response_format: None,
            metadata: Default::default(),
        };

        if self.is_openai_provider() {
            request.response_format = Some(ResponseFormat::JsonSchema {
                json_schema: JsonSchemaDefinition {
                    name: TRIAGE_SCHEMA_NAME.to_string(),
                    strict: Some(true),
                    schema: TriageDecision::json_schema(),
                },
            });
        } else if self.is_anthropic_provider() {
            request.tools = Some(vec![ToolDescription {
                name: TRIAGE_SCHEMA_NAME.to_string(),
                description: "Record the triage decision for the ticket".to_string(),
                parameters: TriageDecision::json_schema(),
            }]);
            request.tool_choice = Some(TRIAGE_SCHEMA_NAME.to_string());
        } else {
            request.response_format = Some(ResponseFormat::Json);
        }

        request
    }
}

#[async_trait]
impl AnalysisInvoker for LlmInvoker {
    async fn invoke(&self, prompt: &PromptText) -> Result<RawText, InvocationError> {
        let request = self.build_completion_request(prompt);

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            "Triage prompt:\n{}",
            prompt
        );

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| InvocationError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            })??;

        response
            .text()
            .filter(|text| !text.trim().is_empty())
            .map(RawText::new)
            .ok_or(InvocationError::EmptyResponse)
    }
}
