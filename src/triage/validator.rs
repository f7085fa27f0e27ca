//! Result parsing, validation, and roster reconciliation
//!
//! Nothing the model returns is trusted as-is:
//! - the text is reduced to its JSON object and parsed leniently,
//! - all three fields must be present and non-empty,
//! - priority is clamped into range,
//! - `agent_id` is reconciled against the roster (exact id, fuzzy name, first agent).

use crate::triage::invoker::RawText;
use crate::triage::result::{AnalysisResult, MAX_PRIORITY, MIN_PRIORITY};
use crate::triage::roster::AgentRoster;
use crate::triage::schema::TriageDecision;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Response could not be turned into a decision
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("Response is not valid JSON: {0}")]
    Unparsable(String),

    #[error("Response is not a JSON object")]
    NotAnObject,

    #[error("Required field missing or empty: {0}")]
    MissingField(&'static str),

    #[error("Field {field} has an invalid value: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
}

/// Which branch reconciled the returned agent identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentResolution {
    /// Returned value is a roster id
    Exact,
    /// Returned value matched an agent's display name
    FuzzyName { returned: String },
    /// Nothing matched; first agent in roster order was used
    Default { returned: String },
}

impl AgentResolution {
    pub fn label(&self) -> &'static str {
        match self {
            AgentResolution::Exact => "exact",
            AgentResolution::FuzzyName { .. } => "fuzzy_name",
            AgentResolution::Default { .. } => "default",
        }
    }
}

/// Roster id chosen for a returned value, with the branch that chose it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAgent {
    pub agent_id: String,
    pub resolution: AgentResolution,
}

/// Reconciled analysis plus how it was reconciled
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAnalysis {
    pub result: AnalysisResult,
    pub resolution: AgentResolution,
    pub priority_clamped: bool,
}

/// Parse, check, clamp, and reconcile a raw response
pub fn validate(raw: &RawText, roster: &AgentRoster) -> Result<ValidatedAnalysis, FormatError> {
    let decision = parse_decision(raw.as_str())?;
    let (priority, priority_clamped) = clamp_priority(decision.priority);
    let resolved = resolve_agent(&decision.agent_id, roster);

    if priority_clamped {
        debug!(
            returned = decision.priority,
            clamped = priority,
            "Priority outside range, clamped"
        );
    }

    Ok(ValidatedAnalysis {
        result: AnalysisResult {
            priority,
            agent_id: resolved.agent_id,
            reason: decision.reason,
        },
        resolution: resolved.resolution,
        priority_clamped,
    })
}

/// Parse the three required fields out of raw model text
pub fn parse_decision(text: &str) -> Result<TriageDecision, FormatError> {
    let object = extract_json_object(text)?;

    Ok(TriageDecision {
        priority: coerce_priority(&object)?,
        agent_id: coerce_agent_id(&object)?,
        reason: coerce_reason(&object)?,
    })
}

/// Clamp into `[MIN_PRIORITY, MAX_PRIORITY]`, reporting whether it moved
pub fn clamp_priority(priority: i64) -> (u8, bool) {
    let clamped = priority.clamp(i64::from(MIN_PRIORITY), i64::from(MAX_PRIORITY));
    (clamped as u8, clamped != priority)
}

/// Reconcile a returned identifier against the roster.
///
/// Yields an empty `agent_id` only when the roster itself is empty.
pub fn resolve_agent(returned: &str, roster: &AgentRoster) -> ResolvedAgent {
    if let Some(agent) = roster.find_by_id(returned) {
        return ResolvedAgent {
            agent_id: agent.id.clone(),
            resolution: AgentResolution::Exact,
        };
    }

    if let Some(agent) = roster.find_by_name_fuzzy(returned) {
        return ResolvedAgent {
            agent_id: agent.id.clone(),
            resolution: AgentResolution::FuzzyName {
                returned: returned.to_string(),
            },
        };
    }

    ResolvedAgent {
        agent_id: roster.first().map(|a| a.id.clone()).unwrap_or_default(),
        resolution: AgentResolution::Default {
            returned: returned.to_string(),
        },
    }
}

/// Find the first complete JSON object in the text.
///
/// Fences and prose around the object are skipped by trying each `{` in turn
/// until one starts a value `serde_json` accepts; anything after it is ignored.
fn extract_json_object(text: &str) -> Result<Map<String, Value>, FormatError> {
    let text = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return match value {
            Value::Object(object) => Ok(object),
            _ => Err(FormatError::NotAnObject),
        };
    }

    let mut first_error = None;
    for (start, _) in text.match_indices('{') {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(Value::Object(object))) => return Ok(object),
            Some(Err(e)) => {
                first_error.get_or_insert_with(|| e.to_string());
            }
            _ => {}
        }
    }

    let message =
        first_error.unwrap_or_else(|| "no JSON object found in response".to_string());
    Err(FormatError::Unparsable(message))
}

fn present<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, FormatError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(FormatError::MissingField(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(FormatError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn coerce_priority(object: &Map<String, Value>) -> Result<i64, FormatError> {
    let invalid = |message: String| FormatError::InvalidField {
        field: "priority",
        message,
    };

    match present(object, "priority")? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
            .ok_or_else(|| invalid(format!("unrepresentable number {n}"))),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.round() as i64)
                })
                .ok_or_else(|| invalid(format!("not a number: {s:?}")))
        }
        other => Err(invalid(format!("unexpected type: {other}"))),
    }
}

fn coerce_agent_id(object: &Map<String, Value>) -> Result<String, FormatError> {
    match present(object, "agent_id")? {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(FormatError::InvalidField {
            field: "agent_id",
            message: format!("unexpected type: {other}"),
        }),
    }
}

fn coerce_reason(object: &Map<String, Value>) -> Result<String, FormatError> {
    match present(object, "reason")? {
        Value::String(s) => Ok(s.clone()),
        other => Err(FormatError::InvalidField {
            field: "reason",
            message: format!("unexpected type: {other}"),
        }),
    }
}
