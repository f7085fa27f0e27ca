//! Structured output schema for triage decisions
//!
//! The schema is advertised to the provider (OpenAI `response_format`,
//! Anthropic forced tool). The parsed record is the validator's intermediate
//! form before clamping and roster reconciliation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name used for the JSON schema and the Anthropic tool
pub const TRIAGE_SCHEMA_NAME: &str = "ticket_triage";

/// Three-field decision the model is asked to return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TriageDecision {
    /// Urgency from 1 (most urgent) to 5 (least urgent)
    pub priority: i64,

    /// Identifier of the selected agent, copied verbatim from the roster
    pub agent_id: String,

    /// Short human-readable justification
    pub reason: String,
}

impl TriageDecision {
    /// Generate the JSON schema for this structure
    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(TriageDecision);
        serde_json::to_value(schema).unwrap_or_default()
    }
}
