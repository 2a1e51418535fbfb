//! Commitments between agents: pledges and alliances.

use serde::{Deserialize, Serialize};

use crate::phase::Week;

/// What an agent committed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PledgeKind {
    /// Won't nominate the recipient
    Safety,
    /// Will vote to keep the recipient
    Vote,
    /// Won't work against the recipient's alliance
    AllianceLoyalty,
    /// Will take the recipient to the end
    FinalTwo,
    /// Will share what they hear
    Information,
}

impl PledgeKind {
    pub fn label(&self) -> &'static str {
        match self {
            PledgeKind::Safety => "safety",
            PledgeKind::Vote => "vote",
            PledgeKind::AllianceLoyalty => "alliance_loyalty",
            PledgeKind::FinalTwo => "final_two",
            PledgeKind::Information => "information",
        }
    }
}

impl std::fmt::Display for PledgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PledgeStatus {
    #[default]
    Pending,
    Active,
    Kept,
    Broken,
    Expired,
}

impl PledgeStatus {
    /// Pending and active pledges still bind the maker
    pub fn is_open(&self) -> bool {
        matches!(self, PledgeStatus::Pending | PledgeStatus::Active)
    }
}

/// A commitment from one agent to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pledge {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub kind: PledgeKind,
    pub status: PledgeStatus,
    pub description: String,
    pub week: Week,
}

impl Pledge {
    pub fn is_active(&self) -> bool {
        self.status == PledgeStatus::Active
    }
}

/// A group of agents working together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alliance {
    pub id: String,
    pub name: String,
    pub members: Vec<String>,
    pub founder: String,
    pub is_public: bool,
    pub formed_week: Week,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_meeting_week: Option<Week>,
}

impl Alliance {
    pub fn contains(&self, agent_id: &str) -> bool {
        self.members.iter().any(|m| m == agent_id)
    }

    pub fn contains_both(&self, a: &str, b: &str) -> bool {
        self.contains(a) && self.contains(b)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// True when no meeting has happened in `week` or later
    pub fn needs_meeting(&self, week: Week) -> bool {
        self.last_meeting_week.map_or(true, |last| last < week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alliance_membership() {
        let alliance = Alliance {
            id: "al_1".to_string(),
            name: "The Core".to_string(),
            members: vec!["ava".to_string(), "bo".to_string()],
            founder: "ava".to_string(),
            is_public: false,
            formed_week: 1,
            last_meeting_week: None,
        };

        assert!(alliance.contains_both("ava", "bo"));
        assert!(!alliance.contains("cy"));
        assert!(alliance.needs_meeting(1));
    }

    #[test]
    fn test_meeting_this_week_suppresses_another() {
        let alliance = Alliance {
            id: "al_1".to_string(),
            name: "The Core".to_string(),
            members: vec!["ava".to_string()],
            founder: "ava".to_string(),
            is_public: false,
            formed_week: 1,
            last_meeting_week: Some(3),
        };

        assert!(!alliance.needs_meeting(3));
        assert!(!alliance.needs_meeting(2));
        assert!(alliance.needs_meeting(4));
    }

    #[test]
    fn test_open_statuses() {
        assert!(PledgeStatus::Pending.is_open());
        assert!(PledgeStatus::Active.is_open());
        assert!(!PledgeStatus::Broken.is_open());
    }
}
