//! Triage engine
//!
//! Orchestrates the pipeline for one ticket:
//!
//! ```text
//! context -> compile -> invoke -> validate -> AnalysisResult
//!                 \________ any failure ________/-> fallback
//! ```
//!
//! `analyze` is total: once a context exists it always produces a result.
//! Only missing preconditions (unknown customer or ticket, unreadable
//! roster, blank subject) are reported as `TriageError`.

use crate::error::{sanitize_error_message, TriageError, TriageResult};
use crate::observability::metrics;
use crate::store::{NewTicket, TicketSnapshot, TicketStore};
use crate::triage::applier::AnalysisApplier;
use crate::triage::context::TriageContext;
use crate::triage::fallback::{fallback_result, AnalysisFailure, FallbackCause};
use crate::triage::invoker::AnalysisInvoker;
use crate::triage::prompt::PromptCompiler;
use crate::triage::result::AnalysisResult;
use crate::triage::roster::AgentRoster;
use crate::triage::validator::{self, ValidatedAnalysis};
use crate::triage_span;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};

/// Outcome of `create_triaged_ticket`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedTicket {
    pub ticket_id: String,
    pub analysis: AnalysisResult,
}

pub struct TriageEngine {
    invoker: Arc<dyn AnalysisInvoker>,
    store: Arc<dyn TicketStore>,
    compiler: PromptCompiler,
    applier: AnalysisApplier,
}

impl TriageEngine {
    pub fn new(invoker: Arc<dyn AnalysisInvoker>, store: Arc<dyn TicketStore>) -> Self {
        Self {
            invoker,
            applier: AnalysisApplier::new(store.clone()),
            store,
            compiler: PromptCompiler::default(),
        }
    }

    pub fn with_compiler(mut self, compiler: PromptCompiler) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn compiler(&self) -> &PromptCompiler {
        &self.compiler
    }

    /// Produce a result for a built context. Never fails.
    pub async fn analyze(&self, context: &TriageContext) -> AnalysisResult {
        let roster = context.roster();
        let span = triage_span!(subject = %context.subject(), roster_size = roster.len());

        async {
            metrics().analysis_started();
            let started = Instant::now();

            if roster.is_empty() {
                info!("Empty roster, skipping analysis");
                metrics().fallback_taken(FallbackCause::NoAgents.label());
                metrics().analysis_completed(started.elapsed());
                return fallback_result(FallbackCause::NoAgents, roster);
            }

            let result = match self.run_analysis(context).await {
                Ok(validated) => {
                    metrics().agent_resolved(validated.resolution.label());
                    if validated.priority_clamped {
                        metrics().priority_clamped();
                    }
                    info!(
                        priority = validated.result.priority,
                        agent_id = %validated.result.agent_id,
                        resolution = validated.resolution.label(),
                        "Ticket analyzed"
                    );
                    validated.result
                }
                Err(failure) => {
                    metrics().analysis_failed(failure.kind());
                    metrics().fallback_taken(FallbackCause::AnalysisError.label());
                    warn!(
                        kind = failure.kind(),
                        error = %sanitize_error_message(&failure.to_string()),
                        "Analysis failed, using fallback assignment"
                    );
                    fallback_result(FallbackCause::AnalysisError, roster)
                }
            };

            metrics().analysis_completed(started.elapsed());
            result
        }
        .instrument(span)
        .await
    }

    async fn run_analysis(
        &self,
        context: &TriageContext,
    ) -> Result<ValidatedAnalysis, AnalysisFailure> {
        let prompt = self.compiler.compile(context);
        let raw = self.invoker.invoke(&prompt).await?;
        debug!(response = %raw, "Raw triage response");
        Ok(validator::validate(&raw, context.roster())?)
    }

    /// Analyze a ticket that is about to be created
    pub async fn triage_new_ticket(
        &self,
        subject: &str,
        description: &str,
        customer_id: &str,
        org_id: &str,
    ) -> TriageResult<AnalysisResult> {
        let customer = self
            .store
            .find_customer(customer_id)
            .await?
            .ok_or_else(|| TriageError::customer_not_found(customer_id))?;
        let roster = self.load_roster(org_id).await?;

        let context = TriageContext::builder()
            .subject(subject)
            .description(description)
            .customer(customer)
            .roster(roster)
            .build()?;

        Ok(self.analyze(&context).await)
    }

    /// Analyze an existing ticket against a caller-supplied roster
    pub async fn triage_existing_ticket(
        &self,
        ticket: &TicketSnapshot,
        roster: AgentRoster,
    ) -> TriageResult<AnalysisResult> {
        let context = TriageContext::builder()
            .subject(ticket.subject.clone())
            .messages(ticket.messages.clone())
            .customer(ticket.customer.clone())
            .roster(roster)
            .build()?;

        Ok(self.analyze(&context).await)
    }

    /// Load a ticket and its organization's roster, analyze, and persist the result
    pub async fn reanalyze_ticket(&self, ticket_id: &str) -> TriageResult<AnalysisResult> {
        let ticket = self
            .store
            .load_ticket(ticket_id)
            .await?
            .ok_or_else(|| TriageError::ticket_not_found(ticket_id))?;
        let roster = self.load_roster(&ticket.org_id).await?;

        let result = self.triage_existing_ticket(&ticket, roster).await?;
        self.applier.apply(&ticket.id, &result).await?;

        Ok(result)
    }

    /// Analyze, then create the ticket with its bucket, assignee, and audit metadata
    pub async fn create_triaged_ticket(
        &self,
        subject: &str,
        description: &str,
        customer_id: &str,
        org_id: &str,
    ) -> TriageResult<CreatedTicket> {
        let analysis = self
            .triage_new_ticket(subject, description, customer_id, org_id)
            .await?;
        let record = AnalysisApplier::record_for(&analysis);

        let ticket_id = self
            .store
            .create_ticket(NewTicket {
                org_id: org_id.to_string(),
                customer_id: customer_id.to_string(),
                subject: subject.to_string(),
                description: description.to_string(),
                priority: record.priority,
                bucket: analysis.bucket(),
                assigned_agent_id: record.agent_id,
                metadata: record.metadata,
            })
            .await?;

        if let Some(agent_id) = analysis.assigned_agent() {
            self.applier.increment_workload(agent_id).await;
        }

        info!(
            ticket_id = %ticket_id,
            bucket = %analysis.bucket(),
            "Created triaged ticket"
        );

        Ok(CreatedTicket {
            ticket_id,
            analysis,
        })
    }

    async fn load_roster(&self, org_id: &str) -> TriageResult<AgentRoster> {
        self.store
            .list_agents(org_id)
            .await
            .map(AgentRoster::from)
            .map_err(|e| TriageError::roster_unavailable(org_id, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::fallback::{ANALYSIS_ERROR_REASON, NO_AGENTS_REASON};
    use crate::triage::invoker::InvocationError;
    use crate::testing::{
        existing_ticket_context, sample_roster, seeded_store, MockInvoker, MockTicketStore,
        CUSTOMER_ID, ORG_ID, TICKET_ID,
    };

    fn engine(invoker: MockInvoker) -> (TriageEngine, Arc<MockInvoker>, Arc<MockTicketStore>) {
        let invoker = Arc::new(invoker);
        let store = Arc::new(MockTicketStore::new(seeded_store()));
        (
            TriageEngine::new(invoker.clone(), store.clone()),
            invoker,
            store,
        )
    }

    #[tokio::test]
    async fn test_analyze_exact_match() {
        let (engine, _, _) = engine(MockInvoker::returning(
            r#"{"priority": 1, "agent_id": "agt-sso", "reason": "Nobody can log in"}"#,
        ));

        let result = engine.analyze(&existing_ticket_context(sample_roster())).await;
        assert_eq!(result.priority, 1);
        assert_eq!(result.agent_id, "agt-sso");
        assert_eq!(result.reason, "Nobody can log in");
    }

    #[tokio::test]
    async fn test_empty_roster_never_invokes() {
        let (engine, invoker, _) = engine(MockInvoker::returning("{}"));

        let result = engine
            .analyze(&existing_ticket_context(AgentRoster::default()))
            .await;

        assert_eq!(result.priority, 3);
        assert_eq!(result.agent_id, "");
        assert_eq!(result.reason, NO_AGENTS_REASON);
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invocation_failure_falls_back_to_first_agent() {
        let (engine, invoker, _) =
            engine(MockInvoker::failing(InvocationError::Timeout { after_ms: 15000 }));

        let result = engine.analyze(&existing_ticket_context(sample_roster())).await;

        assert_eq!(result.priority, 3);
        assert_eq!(result.agent_id, "agt-billing");
        assert_eq!(result.reason, ANALYSIS_ERROR_REASON);
        assert_eq!(invoker.call_count(), 1);
    }

    #[tokio::test]
    async fn test_triage_new_ticket_unknown_customer() {
        let (engine, invoker, _) = engine(MockInvoker::returning("{}"));

        let result = engine
            .triage_new_ticket("Subject", "Body", "cust-missing", ORG_ID)
            .await;

        assert!(matches!(result, Err(TriageError::CustomerNotFound { .. })));
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_subject_is_precondition_error() {
        let (engine, _, _) = engine(MockInvoker::returning("{}"));

        let result = engine
            .triage_new_ticket("   ", "Body", CUSTOMER_ID, ORG_ID)
            .await;

        assert!(matches!(
            result,
            Err(TriageError::MissingContext { field: "subject" })
        ));
    }

    #[tokio::test]
    async fn test_reanalyze_persists_result() {
        let (engine, _, store) = engine(MockInvoker::returning(
            r#"{"priority": 2, "agent_id": "Marcus Webb", "reason": "SSO outage"}"#,
        ));

        let result = engine.reanalyze_ticket(TICKET_ID).await.unwrap();

        assert_eq!(result.agent_id, "agt-sso");
        let writes = store.recorded_writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, TICKET_ID);
        assert_eq!(writes[0].1.priority, 2);
        assert_eq!(store.recorded_increments(), vec!["agt-sso"]);
    }

    #[tokio::test]
    async fn test_reanalyze_unknown_ticket() {
        let (engine, _, _) = engine(MockInvoker::returning("{}"));
        let result = engine.reanalyze_ticket("tkt-missing").await;
        assert!(matches!(result, Err(TriageError::TicketNotFound { .. })));
    }
}
