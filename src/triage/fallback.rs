//! Deterministic fallback results
//!
//! Every path that cannot trust the service's answer ends here, which is what
//! makes the engine total.

use crate::triage::invoker::InvocationError;
use crate::triage::result::AnalysisResult;
use crate::triage::roster::AgentRoster;
use crate::triage::validator::FormatError;
use thiserror::Error;

/// Priority used by every fallback path
pub const FALLBACK_PRIORITY: u8 = 3;

pub const NO_AGENTS_REASON: &str = "No agents available for assignment";
pub const ANALYSIS_ERROR_REASON: &str = "Fallback assignment due to analysis error";

/// Why the fallback was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackCause {
    /// Roster was empty; the service was never called
    NoAgents,
    /// Invocation or format failure
    AnalysisError,
}

impl FallbackCause {
    pub fn reason(&self) -> &'static str {
        match self {
            FallbackCause::NoAgents => NO_AGENTS_REASON,
            FallbackCause::AnalysisError => ANALYSIS_ERROR_REASON,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FallbackCause::NoAgents => "no_agents",
            FallbackCause::AnalysisError => "analysis_error",
        }
    }
}

/// Failure absorbed by the fallback policy
#[derive(Debug, Clone, Error)]
pub enum AnalysisFailure {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl AnalysisFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisFailure::Invocation(InvocationError::Timeout { .. }) => "timeout",
            AnalysisFailure::Invocation(InvocationError::EmptyResponse) => "empty_response",
            AnalysisFailure::Invocation(InvocationError::Provider(_)) => "provider_error",
            AnalysisFailure::Format(FormatError::MissingField(_)) => "missing_field",
            AnalysisFailure::Format(_) => "malformed_response",
        }
    }
}

/// Fallback result: fixed priority, first roster agent (or unassigned), fixed reason
pub fn fallback_result(cause: FallbackCause, roster: &AgentRoster) -> AnalysisResult {
    AnalysisResult {
        priority: FALLBACK_PRIORITY,
        agent_id: roster.first().map(|a| a.id.clone()).unwrap_or_default(),
        reason: cause.reason().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::LlmError;
    use crate::triage::roster::Agent;

    #[test]
    fn test_no_agents_fallback_is_exact() {
        let result = fallback_result(FallbackCause::NoAgents, &AgentRoster::default());
        assert_eq!(
            result,
            AnalysisResult {
                priority: 3,
                agent_id: String::new(),
                reason: "No agents available for assignment".to_string(),
            }
        );
    }

    #[test]
    fn test_analysis_error_uses_first_agent() {
        let roster = AgentRoster::new(vec![Agent::new("first", "F"), Agent::new("second", "S")]);
        let result = fallback_result(FallbackCause::AnalysisError, &roster);

        assert_eq!(result.priority, 3);
        assert_eq!(result.agent_id, "first");
        assert_eq!(result.reason, "Fallback assignment due to analysis error");
    }

    #[test]
    fn test_failure_kinds() {
        let timeout: AnalysisFailure = InvocationError::Timeout { after_ms: 10 }.into();
        assert_eq!(timeout.kind(), "timeout");

        let provider: AnalysisFailure =
            InvocationError::from(LlmError::NetworkError("reset".to_string())).into();
        assert_eq!(provider.kind(), "provider_error");

        let missing: AnalysisFailure = FormatError::MissingField("reason").into();
        assert_eq!(missing.kind(), "missing_field");
        assert!(missing.to_string().contains("reason"));
    }
}
