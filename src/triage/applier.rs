//! Result application
//!
//! Persists an analysis onto a ticket. The analysis write is the only write
//! that matters; the workload counter is advisory and its failures are logged
//! and swallowed.

use crate::apply_span;
use crate::error::sanitize_error_message;
use crate::observability::metrics;
use crate::store::{AnalysisMetadata, AnalysisRecord, StoreError, TicketStore};
use crate::triage::result::AnalysisResult;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

/// Writes analyses through a `TicketStore`
#[derive(Clone)]
pub struct AnalysisApplier {
    store: Arc<dyn TicketStore>,
}

impl AnalysisApplier {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// Flatten a result into the record written onto a ticket
    pub fn record_for(result: &AnalysisResult) -> AnalysisRecord {
        AnalysisRecord {
            priority: result.priority,
            agent_id: result.assigned_agent().map(str::to_string),
            metadata: AnalysisMetadata {
                reason: result.reason.clone(),
                analyzed_at: Utc::now(),
            },
        }
    }

    /// Write the analysis onto `ticket_id`, then bump the assignee's counter.
    ///
    /// Only the analysis write can fail the call.
    pub async fn apply(
        &self,
        ticket_id: &str,
        result: &AnalysisResult,
    ) -> Result<AnalysisRecord, StoreError> {
        let span = apply_span!(ticket_id = %ticket_id, agent_id = %result.agent_id);

        async {
            let record = Self::record_for(result);

            if let Err(e) = self.store.write_analysis(ticket_id, &record).await {
                metrics().apply_failed();
                warn!(
                    error = %sanitize_error_message(&e.to_string()),
                    "Failed to write analysis onto ticket"
                );
                return Err(e);
            }

            metrics().analysis_applied();
            info!(priority = record.priority, "Analysis written");

            if let Some(agent_id) = result.assigned_agent() {
                self.increment_workload(agent_id).await;
            }

            Ok(record)
        }
        .instrument(span)
        .await
    }

    /// Best-effort open-ticket increment; never propagates
    pub async fn increment_workload(&self, agent_id: &str) {
        if let Err(e) = self.store.increment_open_tickets(agent_id).await {
            metrics().increment_failed();
            warn!(
                agent_id = %agent_id,
                error = %sanitize_error_message(&e.to_string()),
                "Failed to increment agent workload counter"
            );
        }
    }
}
