//! Agent roster snapshot
//!
//! A read-only, ordered list of the agents eligible for assignment at the time
//! of a triage call. Order matters: the first agent is the deterministic
//! default when nothing else resolves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Support agent eligible for assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Opaque identifier owned by the ticket store
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub expertise_tags: BTreeSet<String>,
    #[serde(default)]
    pub current_open_tickets: u32,
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expertise_tags: BTreeSet::new(),
            current_open_tickets: 0,
        }
    }

    pub fn with_expertise<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expertise_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_open_tickets(mut self, count: u32) -> Self {
        self.current_open_tickets = count;
        self
    }

    /// Comma-separated expertise for prompt rendering
    pub fn expertise_label(&self) -> String {
        if self.expertise_tags.is_empty() {
            "general".to_string()
        } else {
            self.expertise_tags
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

/// Ordered snapshot of assignable agents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentRoster {
    agents: Vec<Agent>,
}

impl AgentRoster {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// First agent in roster order
    pub fn first(&self) -> Option<&Agent> {
        self.agents.first()
    }

    /// Exact, case-sensitive identifier lookup
    pub fn find_by_id(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    /// Single pass in roster order: the first agent whose name equals `value`
    /// ignoring case, or whose lowercased name contains lowercased `value`.
    ///
    /// A blank `value` never matches.
    pub fn find_by_name_fuzzy(&self, value: &str) -> Option<&Agent> {
        let needle = value.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        self.agents.iter().find(|agent| {
            let name = agent.name.to_lowercase();
            name == needle || name.contains(&needle)
        })
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }
}

impl From<Vec<Agent>> for AgentRoster {
    fn from(agents: Vec<Agent>) -> Self {
        Self::new(agents)
    }
}

impl FromIterator<Agent> for AgentRoster {
    fn from_iter<T: IntoIterator<Item = Agent>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> AgentRoster {
        AgentRoster::new(vec![
            Agent::new("a-100", "Dana Whitfield").with_expertise(["billing", "refunds"]),
            Agent::new("a-200", "Sam Ortiz").with_expertise(["networking"]),
            Agent::new("a-300", "Sam Ortega"),
        ])
    }

    #[test]
    fn test_find_by_id_is_exact() {
        let roster = roster();
        assert_eq!(roster.find_by_id("a-200").unwrap().name, "Sam Ortiz");
        assert!(roster.find_by_id("A-200").is_none());
        assert!(roster.find_by_id("a-2").is_none());
    }

    #[test]
    fn test_fuzzy_matches_full_name_ignoring_case() {
        let roster = roster();
        assert_eq!(roster.find_by_name_fuzzy("dana whitfield").unwrap().id, "a-100");
        assert_eq!(roster.find_by_name_fuzzy("SAM ORTEGA").unwrap().id, "a-300");
    }

    #[test]
    fn test_fuzzy_substring_takes_first_in_roster_order() {
        let roster = roster();
        // "sam" is inside both Sam Ortiz and Sam Ortega; roster order wins
        assert_eq!(roster.find_by_name_fuzzy("Sam").unwrap().id, "a-200");
        assert_eq!(roster.find_by_name_fuzzy("whit").unwrap().id, "a-100");
    }

    #[test]
    fn test_fuzzy_does_not_match_blank_or_superstring() {
        let roster = roster();
        assert!(roster.find_by_name_fuzzy("").is_none());
        assert!(roster.find_by_name_fuzzy("   ").is_none());
        assert!(roster.find_by_name_fuzzy("Dana Whitfield Jr").is_none());
    }

    #[test]
    fn test_expertise_label() {
        let agent = Agent::new("a", "A").with_expertise(["refunds", "billing"]);
        assert_eq!(agent.expertise_label(), "billing, refunds");
        assert_eq!(Agent::new("b", "B").expertise_label(), "general");
    }

    #[test]
    fn test_roster_deserializes_from_array() {
        let json = r#"[{"id": "a1", "name": "Ari", "expertise_tags": ["api"], "current_open_tickets": 4}]"#;
        let roster: AgentRoster = serde_json::from_str(json).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.first().unwrap().current_open_tickets, 4);
    }
}
