//! Integration tests for the OpenAI provider
//!
//! Every request is a single attempt: error statuses must surface after
//! exactly one HTTP call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use ticket_triage::llm::provider::{
    CompletionRequest, FinishReason, LlmError, LlmProvider, Message, MessageRole,
};
use ticket_triage::llm::providers::openai::{OpenAiConfig, OpenAiProvider};
use ticket_triage::testing::{seeded_store, CUSTOMER_ID, ORG_ID};
use ticket_triage::triage::{LlmInvoker, TriageEngine};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> OpenAiConfig {
    OpenAiConfig {
        api_key: "test-api-key".to_string(),
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
    }
}

fn test_request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![Message {
            role: MessageRole::User,
            content: "Triage this".to_string(),
        }],
        model: "gpt-4o-mini".to_string(),
        max_tokens: Some(100),
        temperature: Some(0.1),
        tools: None,
        tool_choice: None,
        response_format: None,
        metadata: HashMap::new(),
    }
}

fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "gpt-4o-mini",
        "choices": [
            {
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }
        ],
        "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150}
    })
}

#[tokio::test]
async fn test_openai_returns_completion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("{\"priority\": 2}")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenAiProvider::new(test_config(&mock_server.uri())).unwrap();
    let response = provider.complete(test_request()).await.unwrap();

    assert_eq!(response.content.as_deref(), Some("{\"priority\": 2}"));
    assert_eq!(response.usage.total_tokens, 150);
    assert!(matches!(response.finish_reason, FinishReason::Stop));
}

#[tokio::test]
async fn test_openai_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenAiProvider::new(test_config(&mock_server.uri())).unwrap();
    let result = provider.complete(test_request()).await;

    match result {
        Err(LlmError::ApiError(msg)) => assert!(msg.contains("server error")),
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_openai_rate_limit_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenAiProvider::new(test_config(&mock_server.uri())).unwrap();
    let result = provider.complete(test_request()).await;

    assert!(matches!(result, Err(LlmError::RateLimitExceeded(_))));
}

#[tokio::test]
async fn test_openai_auth_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenAiProvider::new(test_config(&mock_server.uri())).unwrap();
    let result = provider.complete(test_request()).await;

    assert!(matches!(result, Err(LlmError::AuthenticationFailed(_))));
}

#[tokio::test]
async fn test_openai_empty_choices_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-123",
            "model": "gpt-4o-mini",
            "choices": []
        })))
        .mount(&mock_server)
        .await;

    let provider = OpenAiProvider::new(test_config(&mock_server.uri())).unwrap();
    let result = provider.complete(test_request()).await;

    assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
}

#[test]
fn test_openai_requires_api_key() {
    let config = OpenAiConfig {
        api_key: String::new(),
        ..Default::default()
    };
    assert!(matches!(
        OpenAiProvider::new(config),
        Err(LlmError::NotConfigured(_))
    ));
}

#[tokio::test]
async fn test_engine_over_openai_sends_strict_schema_and_resolves_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "response_format": {
                "type": "json_schema",
                "json_schema": {"name": "ticket_triage", "strict": true}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            r#"{"priority": 2, "agent_id": "Priya Natarajan", "reason": "Duplicate charge on invoice"}"#,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = Arc::new(OpenAiProvider::new(test_config(&mock_server.uri())).unwrap());
    let invoker = Arc::new(LlmInvoker::new(provider, "gpt-4o-mini"));
    let engine = TriageEngine::new(invoker, Arc::new(seeded_store()));

    let result = engine
        .triage_new_ticket(
            "Charged twice",
            "Invoice INV-3391 was billed twice.",
            CUSTOMER_ID,
            ORG_ID,
        )
        .await
        .unwrap();

    assert_eq!(result.priority, 2);
    assert_eq!(result.agent_id, "agt-billing");
}

#[tokio::test]
async fn test_engine_over_openai_falls_back_on_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = Arc::new(OpenAiProvider::new(test_config(&mock_server.uri())).unwrap());
    let invoker = Arc::new(LlmInvoker::new(provider, "gpt-4o-mini"));
    let engine = TriageEngine::new(invoker, Arc::new(seeded_store()));

    let result = engine
        .triage_new_ticket("Charged twice", "Billed twice.", CUSTOMER_ID, ORG_ID)
        .await
        .unwrap();

    assert_eq!(result.priority, 3);
    assert_eq!(result.agent_id, "agt-billing");
    assert_eq!(result.reason, "Fallback assignment due to analysis error");
}
