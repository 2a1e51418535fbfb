//! Agent Records
//!
//! Read-only view of a houseguest as the engine sees it.

use serde::{Deserialize, Serialize};

/// Whether an agent is still competing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Active,
    Evicted,
    /// Evicted late enough to vote in the finale
    Juror,
}

/// Ability stats, each on a 0-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilityStats {
    pub competition: f64,
    pub social: f64,
    pub strategic: f64,
    pub physical: f64,
}

impl Default for AbilityStats {
    fn default() -> Self {
        Self {
            competition: 5.0,
            social: 5.0,
            strategic: 5.0,
            physical: 5.0,
        }
    }
}

impl AbilityStats {
    pub fn new(competition: f64, social: f64, strategic: f64, physical: f64) -> Self {
        Self {
            competition: competition.clamp(0.0, 10.0),
            social: social.clamp(0.0, 10.0),
            strategic: strategic.clamp(0.0, 10.0),
            physical: physical.clamp(0.0, 10.0),
        }
    }
}

/// Competition wins so far this season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CompetitionRecord {
    /// Head-of-household wins
    pub hoh_wins: u32,
    /// Power-of-veto wins
    pub veto_wins: u32,
}

impl CompetitionRecord {
    pub fn total(&self) -> u32 {
        self.hoh_wins + self.veto_wins
    }
}

/// A simulated participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: AgentStatus,
    /// Open set of personality tags ("Strategic", "Loyal", ...)
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub stats: AbilityStats,
    #[serde(default)]
    pub record: CompetitionRecord,
    /// Controlled by a human; the planner never acts for these
    #[serde(default)]
    pub is_player: bool,
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: AgentStatus::Active,
            traits: Vec::new(),
            stats: AbilityStats::default(),
            record: CompetitionRecord::default(),
            is_player: false,
        }
    }

    pub fn with_traits<I, S>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.traits = traits.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stats(mut self, stats: AbilityStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_record(mut self, hoh_wins: u32, veto_wins: u32) -> Self {
        self.record = CompetitionRecord { hoh_wins, veto_wins };
        self
    }

    pub fn as_player(mut self) -> Self {
        self.is_player = true;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    /// Case-insensitive trait lookup
    pub fn has_trait(&self, tag: &str) -> bool {
        self.traits.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}
