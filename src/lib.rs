//! Ticket triage and assignment engine
//!
//! For a new or re-analyzed support ticket, asks a text-generation service for
//! a priority (1 most urgent, 5 least) and an owning agent from the
//! organization's roster, reconciles the answer against that roster, and
//! degrades to a deterministic fallback whenever the answer cannot be used.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use ticket_triage::testing::{new_ticket_context, sample_roster, seeded_store, MockInvoker};
//! use ticket_triage::triage::TriageEngine;
//!
//! # tokio_test::block_on(async {
//! let invoker = Arc::new(MockInvoker::returning(
//!     r#"{"priority": 9, "agent_id": "Priya Natarajan", "reason": "Double charge"}"#,
//! ));
//! let engine = TriageEngine::new(invoker, Arc::new(seeded_store()));
//!
//! let result = engine.analyze(&new_ticket_context(sample_roster())).await;
//! assert_eq!(result.priority, 5);
//! assert_eq!(result.agent_id, "agt-billing");
//! # });
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod observability;
pub mod store;
pub mod testing;
pub mod triage;

pub use config::{ConfigError, TriageConfig};
pub use error::{sanitize_error_message, TriageError, TriageResult};
pub use store::{InMemoryTicketStore, TicketStore};
pub use triage::{AnalysisResult, PriorityBucket, TriageContext, TriageEngine};
