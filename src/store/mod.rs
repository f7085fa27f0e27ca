//! Ticket store interface
//!
//! The engine never owns persistence. It reads ticket, customer, and roster
//! shapes through `TicketStore` and issues two kinds of writes: the analysis
//! record and the advisory workload increment.

pub mod memory;

use crate::triage::bucket::PriorityBucket;
use crate::triage::context::{Customer, TicketMessage};
use crate::triage::roster::Agent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::InMemoryTicketStore;

/// Audit metadata written alongside every analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub reason: String,
    pub analyzed_at: DateTime<Utc>,
}

/// Flattened analysis as written onto a ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub priority: u8,
    /// `None` leaves the ticket unassigned
    pub agent_id: Option<String>,
    pub metadata: AnalysisMetadata,
}

/// Ticket as read for re-analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSnapshot {
    pub id: String,
    pub org_id: String,
    pub subject: String,
    pub customer: Customer,
    #[serde(default)]
    pub messages: Vec<TicketMessage>,
}

/// Ticket to create from a new-ticket analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTicket {
    pub org_id: String,
    pub customer_id: String,
    pub subject: String,
    pub description: String,
    pub priority: u8,
    pub bucket: PriorityBucket,
    pub assigned_agent_id: Option<String>,
    pub metadata: AnalysisMetadata,
}

/// Ticket store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read or write store snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize store snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// External persistence collaborator
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn find_customer(&self, customer_id: &str) -> Result<Option<Customer>, StoreError>;

    /// Assignable agents of an organization, in roster order
    async fn list_agents(&self, org_id: &str) -> Result<Vec<Agent>, StoreError>;

    async fn load_ticket(&self, ticket_id: &str) -> Result<Option<TicketSnapshot>, StoreError>;

    /// Returns the new ticket's id
    async fn create_ticket(&self, ticket: NewTicket) -> Result<String, StoreError>;

    /// Write priority, assignee, and audit metadata onto an existing ticket
    async fn write_analysis(
        &self,
        ticket_id: &str,
        record: &AnalysisRecord,
    ) -> Result<(), StoreError>;

    /// Advisory open-ticket counter bump
    async fn increment_open_tickets(&self, agent_id: &str) -> Result<(), StoreError>;
}
