//! In-memory ticket store backed by a JSON snapshot
//!
//! Used by the CLI against a local snapshot file and by tests. Writes are
//! applied under a single lock, so each analysis write is atomic.

use super::{AnalysisMetadata, AnalysisRecord, NewTicket, StoreError, TicketSnapshot, TicketStore};
use crate::triage::bucket::PriorityBucket;
use crate::triage::context::{Customer, SenderRole, TicketMessage};
use crate::triage::roster::Agent;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Agent row tagged with its organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgAgent {
    pub org_id: String,
    #[serde(flatten)]
    pub agent: Agent,
}

/// Ticket row as persisted in the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTicket {
    pub id: String,
    pub org_id: String,
    pub customer_id: String,
    pub subject: String,
    #[serde(default)]
    pub messages: Vec<TicketMessage>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub bucket: Option<PriorityBucket>,
    #[serde(default)]
    pub assigned_agent_id: Option<String>,
    #[serde(default)]
    pub analysis: Option<AnalysisMetadata>,
}

/// Whole store contents, as read from and written to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub customers: BTreeMap<String, Customer>,
    /// Roster order is file order
    #[serde(default)]
    pub agents: Vec<OrgAgent>,
    #[serde(default)]
    pub tickets: BTreeMap<String, StoredTicket>,
}

/// `TicketStore` over an in-process snapshot
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    state: RwLock<StoreSnapshot>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    /// Load a snapshot from a JSON file
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let content = tokio::fs::read_to_string(path).await?;
        let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
        debug!(
            path = %path.display(),
            tickets = snapshot.tickets.len(),
            agents = snapshot.agents.len(),
            "Loaded ticket store snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Write the current state back as pretty JSON
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&*self.state.read().await)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.clone()
    }

    pub async fn insert_customer(&self, customer_id: impl Into<String>, customer: Customer) {
        self.state
            .write()
            .await
            .customers
            .insert(customer_id.into(), customer);
    }

    pub async fn insert_agent(&self, org_id: impl Into<String>, agent: Agent) {
        self.state.write().await.agents.push(OrgAgent {
            org_id: org_id.into(),
            agent,
        });
    }

    pub async fn insert_ticket(&self, ticket: StoredTicket) {
        self.state
            .write()
            .await
            .tickets
            .insert(ticket.id.clone(), ticket);
    }

    pub async fn ticket(&self, ticket_id: &str) -> Option<StoredTicket> {
        self.state.read().await.tickets.get(ticket_id).cloned()
    }

    pub async fn agent(&self, agent_id: &str) -> Option<Agent> {
        self.state
            .read()
            .await
            .agents
            .iter()
            .find(|row| row.agent.id == agent_id)
            .map(|row| row.agent.clone())
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn find_customer(&self, customer_id: &str) -> Result<Option<Customer>, StoreError> {
        Ok(self.state.read().await.customers.get(customer_id).cloned())
    }

    async fn list_agents(&self, org_id: &str) -> Result<Vec<Agent>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .agents
            .iter()
            .filter(|row| row.org_id == org_id)
            .map(|row| row.agent.clone())
            .collect())
    }

    async fn load_ticket(&self, ticket_id: &str) -> Result<Option<TicketSnapshot>, StoreError> {
        let state = self.state.read().await;
        let Some(ticket) = state.tickets.get(ticket_id) else {
            return Ok(None);
        };

        let customer = state
            .customers
            .get(&ticket.customer_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("customer {}", ticket.customer_id)))?;

        Ok(Some(TicketSnapshot {
            id: ticket.id.clone(),
            org_id: ticket.org_id.clone(),
            subject: ticket.subject.clone(),
            customer,
            messages: ticket.messages.clone(),
        }))
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let stored = StoredTicket {
            id: id.clone(),
            org_id: ticket.org_id,
            customer_id: ticket.customer_id,
            subject: ticket.subject,
            messages: vec![TicketMessage::new(SenderRole::Customer, ticket.description)],
            priority: Some(ticket.priority),
            bucket: Some(ticket.bucket),
            assigned_agent_id: ticket.assigned_agent_id,
            analysis: Some(ticket.metadata),
        };

        self.state.write().await.tickets.insert(id.clone(), stored);
        Ok(id)
    }

    async fn write_analysis(
        &self,
        ticket_id: &str,
        record: &AnalysisRecord,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let ticket = state
            .tickets
            .get_mut(ticket_id)
            .ok_or_else(|| StoreError::NotFound(format!("ticket {ticket_id}")))?;

        ticket.priority = Some(record.priority);
        ticket.assigned_agent_id = record.agent_id.clone();
        ticket.analysis = Some(record.metadata.clone());
        Ok(())
    }

    async fn increment_open_tickets(&self, agent_id: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let row = state
            .agents
            .iter_mut()
            .find(|row| row.agent.id == agent_id)
            .ok_or_else(|| StoreError::NotFound(format!("agent {agent_id}")))?;

        row.agent.current_open_tickets = row.agent.current_open_tickets.saturating_add(1);
        Ok(())
    }
}
