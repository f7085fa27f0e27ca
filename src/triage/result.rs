//! Engine output type.

use crate::triage::bucket::PriorityBucket;
use serde::{Deserialize, Serialize};

/// Most urgent priority
pub const MIN_PRIORITY: u8 = 1;
/// Least urgent priority
pub const MAX_PRIORITY: u8 = 5;

/// Final triage decision handed to the applier and the caller.
///
/// `priority` is always within `[MIN_PRIORITY, MAX_PRIORITY]`. `agent_id` is
/// either empty (unassigned) or the id of an agent from the roster that was
/// supplied for this call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub priority: u8,
    pub agent_id: String,
    pub reason: String,
}

impl AnalysisResult {
    /// Assigned agent, `None` for the empty sentinel
    pub fn assigned_agent(&self) -> Option<&str> {
        (!self.agent_id.is_empty()).then_some(self.agent_id.as_str())
    }

    pub fn is_assigned(&self) -> bool {
        !self.agent_id.is_empty()
    }

    /// Bucket used when a ticket is first created from this analysis
    pub fn bucket(&self) -> PriorityBucket {
        PriorityBucket::from_priority(self.priority)
    }
}
