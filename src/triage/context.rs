//! Triage decision input
//!
//! A `TriageContext` is assembled fresh for every call and never mutated
//! afterwards. New tickets carry a single description; re-analysis carries the
//! ordered message history.

use crate::error::{TriageError, TriageResult};
use crate::triage::roster::AgentRoster;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who wrote a ticket message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    Customer,
    Agent,
    System,
}

impl fmt::Display for SenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SenderRole::Customer => "customer",
            SenderRole::Agent => "agent",
            SenderRole::System => "system",
        })
    }
}

/// One entry of a ticket's conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketMessage {
    pub sender_role: SenderRole,
    pub text: String,
}

impl TicketMessage {
    pub fn new(sender_role: SenderRole, text: impl Into<String>) -> Self {
        Self {
            sender_role,
            text: text.into(),
        }
    }
}

/// Customer identity shown to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
}

impl Customer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Ticket text: a description at creation time, messages on re-analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TicketBody {
    Description(String),
    Messages(Vec<TicketMessage>),
}

/// Immutable input to one triage decision
#[derive(Debug, Clone, PartialEq)]
pub struct TriageContext {
    subject: String,
    body: TicketBody,
    customer: Customer,
    roster: AgentRoster,
}

impl TriageContext {
    pub fn builder() -> TriageContextBuilder {
        TriageContextBuilder::default()
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &TicketBody {
        &self.body
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn roster(&self) -> &AgentRoster {
        &self.roster
    }
}

/// Builder for [`TriageContext`].
///
/// Subject, body, customer, and roster are all required. An empty roster is
/// accepted; it is the engine's job to short-circuit it to the fallback.
#[derive(Debug, Default)]
pub struct TriageContextBuilder {
    subject: Option<String>,
    body: Option<TicketBody>,
    customer: Option<Customer>,
    roster: Option<AgentRoster>,
}

impl TriageContextBuilder {
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.body = Some(TicketBody::Description(description.into()));
        self
    }

    pub fn messages(mut self, messages: Vec<TicketMessage>) -> Self {
        self.body = Some(TicketBody::Messages(messages));
        self
    }

    pub fn customer(mut self, customer: Customer) -> Self {
        self.customer = Some(customer);
        self
    }

    pub fn roster(mut self, roster: impl Into<AgentRoster>) -> Self {
        self.roster = Some(roster.into());
        self
    }

    pub fn build(self) -> TriageResult<TriageContext> {
        let subject = self
            .subject
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| TriageError::missing_context("subject"))?;
        let body = self
            .body
            .ok_or_else(|| TriageError::missing_context("description or messages"))?;
        let customer = self
            .customer
            .ok_or_else(|| TriageError::missing_context("customer"))?;
        let roster = self
            .roster
            .ok_or_else(|| TriageError::missing_context("roster"))?;

        Ok(TriageContext {
            subject,
            body,
            customer,
            roster,
        })
    }
}
