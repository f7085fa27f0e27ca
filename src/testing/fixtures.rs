//! Shared test fixtures
//!
//! A small organization with three agents, one customer, and one open ticket.

use crate::store::memory::{StoreSnapshot, StoredTicket};
use crate::store::InMemoryTicketStore;
use crate::triage::context::{Customer, SenderRole, TicketMessage, TriageContext};
use crate::triage::roster::{Agent, AgentRoster};

pub const ORG_ID: &str = "org-acme";
pub const CUSTOMER_ID: &str = "cust-42";
pub const TICKET_ID: &str = "tkt-1001";

pub fn sample_roster() -> AgentRoster {
    AgentRoster::new(vec![
        Agent::new("agt-billing", "Priya Natarajan")
            .with_expertise(["billing", "refunds"])
            .with_open_tickets(4),
        Agent::new("agt-sso", "Marcus Webb")
            .with_expertise(["sso", "authentication"])
            .with_open_tickets(2),
        Agent::new("agt-general", "Dana Lee"),
    ])
}

pub fn sample_customer() -> Customer {
    Customer::new("Jordan Alvarez", "jordan@globex.example")
}

pub fn sample_messages() -> Vec<TicketMessage> {
    vec![
        TicketMessage::new(SenderRole::Customer, "Our SSO login loops back to the sign-in page."),
        TicketMessage::new(SenderRole::Agent, "Which identity provider are you using?"),
        TicketMessage::new(SenderRole::Customer, "Okta. Nobody on the team can log in."),
    ]
}

/// Context for a ticket being created
pub fn new_ticket_context(roster: AgentRoster) -> TriageContext {
    TriageContext::builder()
        .subject("Charged twice for March invoice")
        .description("My card was billed twice for invoice INV-3391. Please refund one charge.")
        .customer(sample_customer())
        .roster(roster)
        .build()
        .expect("fixture context is complete")
}

/// Context for re-analysis of an existing ticket
pub fn existing_ticket_context(roster: AgentRoster) -> TriageContext {
    TriageContext::builder()
        .subject("SSO login broken")
        .messages(sample_messages())
        .customer(sample_customer())
        .roster(roster)
        .build()
        .expect("fixture context is complete")
}

/// Store seeded with `sample_roster()` under `ORG_ID`, one customer, and one ticket
pub fn seeded_snapshot() -> StoreSnapshot {
    let mut snapshot = StoreSnapshot::default();
    snapshot
        .customers
        .insert(CUSTOMER_ID.to_string(), sample_customer());
    snapshot.agents = sample_roster()
        .iter()
        .cloned()
        .map(|agent| crate::store::memory::OrgAgent {
            org_id: ORG_ID.to_string(),
            agent,
        })
        .collect();
    snapshot.tickets.insert(
        TICKET_ID.to_string(),
        StoredTicket {
            id: TICKET_ID.to_string(),
            org_id: ORG_ID.to_string(),
            customer_id: CUSTOMER_ID.to_string(),
            subject: "SSO login broken".to_string(),
            messages: sample_messages(),
            priority: None,
            bucket: None,
            assigned_agent_id: None,
            analysis: None,
        },
    );
    snapshot
}

pub fn seeded_store() -> InMemoryTicketStore {
    InMemoryTicketStore::from_snapshot(seeded_snapshot())
}
