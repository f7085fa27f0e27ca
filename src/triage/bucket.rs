//! Priority buckets stored on newly created tickets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse label derived from a numeric priority.
///
/// The mapping is deliberately non-linear: 1 and 2 are both `Urgent`, while
/// `High` covers only 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityBucket {
    Urgent,
    High,
    Normal,
    Low,
}

impl PriorityBucket {
    /// Out-of-range input is treated as its nearest bound.
    pub fn from_priority(priority: u8) -> Self {
        match priority {
            0..=2 => PriorityBucket::Urgent,
            3 => PriorityBucket::High,
            4 => PriorityBucket::Normal,
            _ => PriorityBucket::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityBucket::Urgent => "urgent",
            PriorityBucket::High => "high",
            PriorityBucket::Normal => "normal",
            PriorityBucket::Low => "low",
        }
    }
}

impl fmt::Display for PriorityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustive_mapping() {
        assert_eq!(PriorityBucket::from_priority(1), PriorityBucket::Urgent);
        assert_eq!(PriorityBucket::from_priority(2), PriorityBucket::Urgent);
        assert_eq!(PriorityBucket::from_priority(3), PriorityBucket::High);
        assert_eq!(PriorityBucket::from_priority(4), PriorityBucket::Normal);
        assert_eq!(PriorityBucket::from_priority(5), PriorityBucket::Low);
    }

    #[test]
    fn test_out_of_range_uses_nearest_bound() {
        assert_eq!(PriorityBucket::from_priority(0), PriorityBucket::Urgent);
        assert_eq!(PriorityBucket::from_priority(9), PriorityBucket::Low);
    }

    #[test]
    fn test_serialized_labels() {
        assert_eq!(serde_json::to_string(&PriorityBucket::Urgent).unwrap(), "\"urgent\"");
        assert_eq!(serde_json::to_string(&PriorityBucket::High).unwrap(), "\"high\"");
        assert_eq!(PriorityBucket::Normal.to_string(), "normal");
        assert_eq!(PriorityBucket::Low.as_str(), "low");
    }
}
