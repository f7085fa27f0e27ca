//! Ticket triage pipeline
//!
//! Builder ([`context`]) -> compiler ([`prompt`]) -> invoker ([`invoker`]) ->
//! validator ([`validator`]) -> fallback ([`fallback`]) -> applier ([`applier`]),
//! orchestrated by [`engine::TriageEngine`].

pub mod applier;
pub mod bucket;
pub mod context;
pub mod engine;
pub mod fallback;
pub mod invoker;
pub mod prompt;
pub mod result;
pub mod roster;
pub mod schema;
pub mod validator;

pub use applier::AnalysisApplier;
pub use bucket::PriorityBucket;
pub use context::{Customer, SenderRole, TicketBody, TicketMessage, TriageContext};
pub use engine::{CreatedTicket, TriageEngine};
pub use fallback::{fallback_result, FallbackCause};
pub use invoker::{AnalysisInvoker, InvocationError, LlmInvoker, RawText};
pub use prompt::{compile, PromptCompiler, PromptText};
pub use result::AnalysisResult;
pub use roster::{Agent, AgentRoster};
pub use validator::{AgentResolution, FormatError};
