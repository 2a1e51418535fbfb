//! Game calendar types.

use serde::{Deserialize, Serialize};

/// Week counter; the season starts at week 1
pub type Week = u32;

/// Phases of a game week, in the order the driver runs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Social,
    HeadOfHousehold,
    Nomination,
    Veto,
    VetoCeremony,
    Eviction,
    Jury,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Social => "social",
            Phase::HeadOfHousehold => "head_of_household",
            Phase::Nomination => "nomination",
            Phase::Veto => "veto",
            Phase::VetoCeremony => "veto_ceremony",
            Phase::Eviction => "eviction",
            Phase::Jury => "jury",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
