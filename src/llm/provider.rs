//! Text-generation provider abstraction
//!
//! Defines the request/response shapes and the `LlmProvider` trait that the
//! triage invoker talks to. Concrete backends live in `providers`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A single message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// Message roles in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Function-style tool exposed to the model, used to force structured output
/// on providers without JSON-schema response formats.
#[derive(Debug, Clone)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Completion request parameters
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub tools: Option<Vec<ToolDescription>>,
    pub tool_choice: Option<String>,
    pub response_format: Option<ResponseFormat>,
    pub metadata: HashMap<String, String>,
}

/// Tool call returned by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: Option<String>,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: FinishReason,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub metadata: HashMap<String, String>,
}

impl CompletionResponse {
    /// Text payload of the response.
    ///
    /// A tool call wins over plain content: when the model was forced onto a
    /// tool, its arguments are the structured answer and any text is narration.
    pub fn text(&self) -> Option<String> {
        if let Some(call) = self.tool_calls.as_ref().and_then(|calls| calls.first()) {
            return Some(call.arguments.to_string());
        }

        self.content
            .as_ref()
            .filter(|c| !c.trim().is_empty())
            .cloned()
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason why completion finished
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolUse,
    Error,
}

/// Response format for structured outputs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Plain text response
    #[default]
    Text,
    /// JSON object without schema validation
    Json,
    /// JSON with strict schema validation
    JsonSchema { json_schema: JsonSchemaDefinition },
}

/// JSON Schema definition for structured outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSchemaDefinition {
    pub name: String,
    /// Strict mode (OpenAI only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    pub schema: serde_json::Value,
}

/// Provider trait for dependency injection and testing
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "openai", "anthropic")
    fn name(&self) -> &str;

    /// Generate a completion from the given request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Provider errors
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API error: {0}")]
    ApiError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(content: Option<&str>, tool_calls: Option<Vec<ToolCall>>) -> CompletionResponse {
        CompletionResponse {
            content: content.map(str::to_string),
            model: "test".to_string(),
            usage: TokenUsage::default(),
            finish_reason: FinishReason::Stop,
            tool_calls,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_text_reads_content_without_tool_calls() {
        let resp = response(Some("{\"priority\":2}"), None);
        assert_eq!(resp.text().as_deref(), Some("{\"priority\":2}"));
    }

    #[test]
    fn test_text_prefers_tool_arguments_over_narration() {
        let call = ToolCall {
            id: "toolu_2".to_string(),
            name: "ticket_triage".to_string(),
            arguments: json!({"priority": 1, "agent_id": "a1", "reason": "outage"}),
        };
        let resp = response(Some("Let me record the decision."), Some(vec![call]));

        let text = resp.text().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["priority"], 1);
    }

    #[test]
    fn test_text_falls_back_to_tool_arguments() {
        let call = ToolCall {
            id: "toolu_1".to_string(),
            name: "ticket_triage".to_string(),
            arguments: json!({"priority": 1, "agent_id": "a1", "reason": "outage"}),
        };
        let resp = response(Some("   "), Some(vec![call]));

        let text = resp.text().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["agent_id"], "a1");
    }

    #[test]
    fn test_text_none_when_empty() {
        assert!(response(None, None).text().is_none());
        assert!(response(Some(""), Some(vec![])).text().is_none());
    }

    #[test]
    fn test_token_usage_default() {
        let usage = TokenUsage::default();
        assert_eq!(usage.prompt_tokens, 0);
        assert_eq!(usage.completion_tokens, 0);
        assert_eq!(usage.total_tokens, 0);
    }

    #[test]
    fn test_message_role_serialization() {
        assert_eq!(serde_json::to_string(&MessageRole::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_llm_error_display() {
        let errors = vec![
            LlmError::NotConfigured("x".to_string()),
            LlmError::AuthenticationFailed("x".to_string()),
            LlmError::RateLimitExceeded("x".to_string()),
            LlmError::RequestFailed("x".to_string()),
            LlmError::InvalidResponse("x".to_string()),
            LlmError::NetworkError("x".to_string()),
            LlmError::ApiError("x".to_string()),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }
}
