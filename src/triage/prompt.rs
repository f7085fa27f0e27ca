//! Prompt compilation
//!
//! Renders a `TriageContext` into a deterministic instruction. The same
//! context always yields byte-identical text, which keeps prompts diffable in
//! logs and makes the compiler trivially testable.

use crate::triage::context::{TicketBody, TriageContext};
use crate::triage::roster::AgentRoster;
use std::fmt;

/// Trailing messages included on the re-analysis path
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

/// System message paired with every compiled prompt
pub const SYSTEM_PROMPT: &str = "You are a customer support triage assistant. You assess ticket urgency and pick the best agent from a fixed list. You always answer with a single JSON object and nothing else.";

/// Compiled instruction text sent to the text-generation service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptText(String);

impl PromptText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for PromptText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl fmt::Display for PromptText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compile with the default history window
pub fn compile(context: &TriageContext) -> PromptText {
    PromptCompiler::default().compile(context)
}

/// Pure renderer from context to prompt text
#[derive(Debug, Clone, Copy)]
pub struct PromptCompiler {
    history_window: usize,
}

impl Default for PromptCompiler {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }
}

impl PromptCompiler {
    pub fn with_history_window(history_window: usize) -> Self {
        Self {
            history_window: history_window.max(1),
        }
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    pub fn compile(&self, context: &TriageContext) -> PromptText {
        let customer = context.customer();

        PromptText(format!(
            r#"Triage the support ticket below.

TASK:
1. Assign a priority from 1 to 5, where 1 is the most urgent and 5 the least urgent.
2. Select exactly one agent from the AVAILABLE AGENTS list to own the ticket.

TICKET SUBJECT:
{}

CUSTOMER:
{} <{}>

{}

{}

RULES:
- agent_id MUST be copied verbatim from the id column of AVAILABLE AGENTS. Never return an agent's name.
- Prefer agents whose expertise matches the ticket; use open-ticket counts to break ties.
- Respond with ONLY a JSON object with exactly these three fields:
{{"priority": <integer 1-5>, "agent_id": "<id from the list>", "reason": "<short justification>"}}"#,
            context.subject(),
            customer.name,
            customer.email,
            self.format_body(context.body()),
            Self::format_roster(context.roster()),
        ))
    }

    fn format_body(&self, body: &TicketBody) -> String {
        match body {
            TicketBody::Description(description) => {
                format!("TICKET DESCRIPTION:\n{description}")
            }
            TicketBody::Messages(messages) if messages.is_empty() => {
                "RECENT MESSAGES:\nNo messages yet.".to_string()
            }
            TicketBody::Messages(messages) => {
                let skip = messages.len().saturating_sub(self.history_window);
                let mut output = format!(
                    "RECENT MESSAGES (last {} of {}):\n",
                    messages.len() - skip,
                    messages.len()
                );
                for message in &messages[skip..] {
                    output.push_str(&format!("[{}] {}\n", message.sender_role, message.text));
                }
                output.trim_end().to_string()
            }
        }
    }

    fn format_roster(roster: &AgentRoster) -> String {
        if roster.is_empty() {
            return "AVAILABLE AGENTS:\nNo agents available.".to_string();
        }

        let mut output = String::from("AVAILABLE AGENTS (id | name | expertise | open tickets):\n");
        for (i, agent) in roster.iter().enumerate() {
            output.push_str(&format!(
                "{}. {} | {} | {} | {}\n",
                i + 1,
                agent.id,
                agent.name,
                agent.expertise_label(),
                agent.current_open_tickets
            ));
        }
        output.trim_end().to_string()
    }
}
