//! Mock implementations for testing
//!
//! Provides mock LlmProvider, AnalysisInvoker, and TicketStore implementations
//! so the engine can be exercised without network access or a database.

use crate::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, TokenUsage,
};
use crate::store::{
    AnalysisRecord, InMemoryTicketStore, NewTicket, StoreError, TicketSnapshot, TicketStore,
};
use crate::triage::context::Customer;
use crate::triage::invoker::{AnalysisInvoker, InvocationError, RawText};
use crate::triage::prompt::PromptText;
use crate::triage::roster::Agent;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Mock LLM provider for testing
#[derive(Debug)]
pub struct MockLlmProvider {
    pub responses: Vec<String>,
    pub should_fail: bool,
    name: String,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            should_fail: false,
            name: "mock".to_string(),
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Self::new(vec![])
        }
    }

    pub fn single_response(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Report a different provider name, e.g. "openai"
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn captured_requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail {
            return Err(LlmError::RequestFailed("Mock LLM failure".to_string()));
        }

        let content = if self.responses.is_empty() {
            "Mock response".to_string()
        } else {
            self.responses[index % self.responses.len()].clone()
        };

        Ok(CompletionResponse {
            content: Some(content),
            model: "mock-model".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: FinishReason::Stop,
            tool_calls: None,
            metadata: HashMap::new(),
        })
    }
}

/// Scripted analysis invoker; outcomes are replayed in order and cycle
#[derive(Debug)]
pub struct MockInvoker {
    outcomes: Vec<Result<RawText, InvocationError>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockInvoker {
    pub fn new(outcomes: Vec<Result<RawText, InvocationError>>) -> Self {
        Self {
            outcomes,
            delay: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always return `text`
    pub fn returning(text: impl Into<String>) -> Self {
        Self::new(vec![Ok(RawText::new(text))])
    }

    /// Always fail with `error`
    pub fn failing(error: InvocationError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn captured_prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AnalysisInvoker for MockInvoker {
    async fn invoke(&self, prompt: &PromptText) -> Result<RawText, InvocationError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.as_str().to_string());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.outcomes.is_empty() {
            return Err(InvocationError::EmptyResponse);
        }
        self.outcomes[index % self.outcomes.len()].clone()
    }
}

/// Ticket store wrapper that records writes and injects failures
#[derive(Debug, Default)]
pub struct MockTicketStore {
    pub inner: InMemoryTicketStore,
    pub fail_roster: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_increments: AtomicBool,
    writes: Mutex<Vec<(String, AnalysisRecord)>>,
    increments: Mutex<Vec<String>>,
    created: Mutex<Vec<NewTicket>>,
}

impl MockTicketStore {
    pub fn new(inner: InMemoryTicketStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn failing_roster(self) -> Self {
        self.fail_roster.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_increments(self) -> Self {
        self.fail_increments.store(true, Ordering::SeqCst);
        self
    }

    pub fn recorded_writes(&self) -> Vec<(String, AnalysisRecord)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Agent ids passed to `increment_open_tickets`, including failed attempts
    pub fn recorded_increments(&self) -> Vec<String> {
        self.increments.lock().map(|i| i.clone()).unwrap_or_default()
    }

    pub fn created_tickets(&self) -> Vec<NewTicket> {
        self.created.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TicketStore for MockTicketStore {
    async fn find_customer(&self, customer_id: &str) -> Result<Option<Customer>, StoreError> {
        self.inner.find_customer(customer_id).await
    }

    async fn list_agents(&self, org_id: &str) -> Result<Vec<Agent>, StoreError> {
        if self.fail_roster.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("roster lookup failed".to_string()));
        }
        self.inner.list_agents(org_id).await
    }

    async fn load_ticket(&self, ticket_id: &str) -> Result<Option<TicketSnapshot>, StoreError> {
        self.inner.load_ticket(ticket_id).await
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<String, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("ticket insert failed".to_string()));
        }
        if let Ok(mut created) = self.created.lock() {
            created.push(ticket.clone());
        }
        self.inner.create_ticket(ticket).await
    }

    async fn write_analysis(
        &self,
        ticket_id: &str,
        record: &AnalysisRecord,
    ) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("ticket update failed".to_string()));
        }
        self.inner.write_analysis(ticket_id, record).await?;
        if let Ok(mut writes) = self.writes.lock() {
            writes.push((ticket_id.to_string(), record.clone()));
        }
        Ok(())
    }

    async fn increment_open_tickets(&self, agent_id: &str) -> Result<(), StoreError> {
        if let Ok(mut increments) = self.increments.lock() {
            increments.push(agent_id.to_string());
        }
        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("counter update failed".to_string()));
        }
        self.inner.increment_open_tickets(agent_id).await
    }
}
