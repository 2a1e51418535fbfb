//! Major Decisions
//!
//! High-stakes choices routed through the orchestrator. Each decision type
//! has its own shape; [`Decision`] is the tagged union of all of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::interaction::InteractionKind;

/// Decision types handled by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    Nomination,
    Veto,
    Replacement,
    EvictionVote,
    JuryVote,
    Dialogue,
}

impl DecisionType {
    pub fn label(&self) -> &'static str {
        match self {
            DecisionType::Nomination => "nomination",
            DecisionType::Veto => "veto",
            DecisionType::Replacement => "replacement",
            DecisionType::EvictionVote => "eviction_vote",
            DecisionType::JuryVote => "jury_vote",
            DecisionType::Dialogue => "dialogue",
        }
    }

    /// Returns all decision type variants.
    pub fn all() -> &'static [DecisionType] {
        &[
            DecisionType::Nomination,
            DecisionType::Veto,
            DecisionType::Replacement,
            DecisionType::EvictionVote,
            DecisionType::JuryVote,
            DecisionType::Dialogue,
        ]
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a decision type name is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDecisionType(pub String);

impl fmt::Display for UnknownDecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown decision type: {}", self.0)
    }
}

impl std::error::Error for UnknownDecisionType {}

impl FromStr for DecisionType {
    type Err = UnknownDecisionType;

    /// Accepts snake_case, camelCase and the short aliases the driver uses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "nomination" | "nominate" => Ok(DecisionType::Nomination),
            "veto" | "useveto" => Ok(DecisionType::Veto),
            "replacement" | "replacementnominee" => Ok(DecisionType::Replacement),
            "evictionvote" | "eviction" | "vote" => Ok(DecisionType::EvictionVote),
            "juryvote" | "jury" => Ok(DecisionType::JuryVote),
            "dialogue" | "dialog" => Ok(DecisionType::Dialogue),
            _ => Err(UnknownDecisionType(s.to_string())),
        }
    }
}

/// Inputs the caller supplies with a decision request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    /// Agents the decider may pick (nomination, replacement)
    #[serde(default)]
    pub eligible: Vec<String>,
    /// Agents currently on the block (veto, eviction vote)
    #[serde(default)]
    pub nominees: Vec<String>,
    /// Agents still in the running at the finale (jury vote)
    #[serde(default)]
    pub finalists: Vec<String>,
    /// Free-form description of the situation, used for dialogue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situation: Option<String>,
}

impl DecisionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eligible<I, S>(mut self, eligible: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eligible = eligible.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_nominees<I, S>(mut self, nominees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nominees = nominees.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_finalists<I, S>(mut self, finalists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.finalists = finalists.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_situation(mut self, situation: impl Into<String>) -> Self {
        self.situation = Some(situation.into());
        self
    }
}

/// A completed decision, one variant per decision type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    Nomination {
        /// Two names when enough candidates exist, fewer otherwise
        nominees: Vec<String>,
        reasoning: String,
    },
    Veto {
        use_veto: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        save_nominee: Option<String>,
        reasoning: String,
    },
    Replacement {
        nominee: Option<String>,
        reasoning: String,
    },
    EvictionVote {
        vote_to_evict: Option<String>,
        reasoning: String,
    },
    JuryVote {
        winner: Option<String>,
        reasoning: String,
    },
    Dialogue {
        message: String,
        reasoning: String,
    },
    /// Returned when the decision type itself was not understood
    Empty,
}

/// An interaction implied by applying a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub to_id: String,
    pub kind: InteractionKind,
    pub description: String,
}

impl Decision {
    pub fn decision_type(&self) -> Option<DecisionType> {
        match self {
            Decision::Nomination { .. } => Some(DecisionType::Nomination),
            Decision::Veto { .. } => Some(DecisionType::Veto),
            Decision::Replacement { .. } => Some(DecisionType::Replacement),
            Decision::EvictionVote { .. } => Some(DecisionType::EvictionVote),
            Decision::JuryVote { .. } => Some(DecisionType::JuryVote),
            Decision::Dialogue { .. } => Some(DecisionType::Dialogue),
            Decision::Empty => None,
        }
    }

    pub fn reasoning(&self) -> Option<&str> {
        match self {
            Decision::Nomination { reasoning, .. }
            | Decision::Veto { reasoning, .. }
            | Decision::Replacement { reasoning, .. }
            | Decision::EvictionVote { reasoning, .. }
            | Decision::JuryVote { reasoning, .. }
            | Decision::Dialogue { reasoning, .. } => Some(reasoning.as_str()),
            Decision::Empty => None,
        }
    }

    /// Interactions `actor` causes when this decision is applied.
    ///
    /// The game-state manager applies decisions; recording these keeps the
    /// ledger consistent with the nominations, saves and votes it performs.
    pub fn ledger_entries(&self, actor: &str) -> Vec<LedgerEntry> {
        match self {
            Decision::Nomination { nominees, .. } => nominees
                .iter()
                .filter(|n| n.as_str() != actor)
                .map(|n| LedgerEntry {
                    to_id: n.clone(),
                    kind: InteractionKind::Nominated,
                    description: format!("{} nominated {}", actor, n),
                })
                .collect(),
            Decision::Veto {
                use_veto: true,
                save_nominee: Some(saved),
                ..
            } if saved != actor => vec![LedgerEntry {
                to_id: saved.clone(),
                kind: InteractionKind::VetoSaved,
                description: format!("{} used the veto on {}", actor, saved),
            }],
            Decision::Replacement {
                nominee: Some(nominee),
                ..
            } => vec![LedgerEntry {
                to_id: nominee.clone(),
                kind: InteractionKind::Nominated,
                description: format!("{} named {} as the replacement nominee", actor, nominee),
            }],
            Decision::EvictionVote {
                vote_to_evict: Some(target),
                ..
            } => vec![LedgerEntry {
                to_id: target.clone(),
                kind: InteractionKind::VotedAgainst,
                description: format!("{} voted to evict {}", actor, target),
            }],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_type_parsing() {
        assert_eq!("nomination".parse::<DecisionType>().unwrap(), DecisionType::Nomination);
        assert_eq!("evictionVote".parse::<DecisionType>().unwrap(), DecisionType::EvictionVote);
        assert_eq!("jury_vote".parse::<DecisionType>().unwrap(), DecisionType::JuryVote);
        assert!("coronation".parse::<DecisionType>().is_err());
    }

    #[test]
    fn test_labels_round_trip() {
        for decision_type in DecisionType::all() {
            assert_eq!(decision_type.label().parse::<DecisionType>().unwrap(), *decision_type);
        }
    }

    #[test]
    fn test_nomination_ledger_entries() {
        let decision = Decision::Nomination {
            nominees: vec!["bo".to_string(), "cy".to_string()],
            reasoning: "threats".to_string(),
        };
        let entries = decision.ledger_entries("ava");
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.kind == InteractionKind::Nominated));
    }

    #[test]
    fn test_self_save_has_no_ledger_entry() {
        let decision = Decision::Veto {
            use_veto: true,
            save_nominee: Some("ava".to_string()),
            reasoning: "self preservation".to_string(),
        };
        assert!(decision.ledger_entries("ava").is_empty());
    }

    #[test]
    fn test_decision_serializes_tagged() {
        let decision = Decision::EvictionVote {
            vote_to_evict: Some("bo".to_string()),
            reasoning: "numbers".to_string(),
        };
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["type"], "eviction_vote");
        assert_eq!(json["vote_to_evict"], "bo");
    }
}
