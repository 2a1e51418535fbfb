//! Interaction Types
//!
//! Typed, immutable records of something one agent did to another.

use serde::{Deserialize, Serialize};

use crate::phase::Week;

/// How an interaction felt to its recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Sentiment implied by the sign of an impact value
    pub fn from_impact(impact: f64) -> Self {
        if impact > 0.0 {
            Sentiment::Positive
        } else if impact < 0.0 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

/// Built-in defaults attached to every interaction kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionDefaults {
    pub sentiment: Sentiment,
    pub impact: f64,
    pub decays: bool,
}

/// Every kind of interaction the ledger understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Conversation,
    AllianceFormed,
    AllianceMeeting,
    AllianceBetrayed,
    PromiseMade,
    PromiseKept,
    PromiseBroken,
    Nominated,
    VetoSaved,
    VotedAgainst,
    RumorSpread,
    Defended,
    Argument,
}

impl InteractionKind {
    /// Default sentiment, impact and decay behaviour for this kind.
    pub fn defaults(&self) -> InteractionDefaults {
        use Sentiment::*;
        let (sentiment, impact, decays) = match self {
            InteractionKind::Conversation => (Positive, 5.0, true),
            InteractionKind::AllianceFormed => (Positive, 20.0, true),
            InteractionKind::AllianceMeeting => (Positive, 5.0, true),
            InteractionKind::AllianceBetrayed => (Negative, -50.0, false),
            InteractionKind::PromiseMade => (Positive, 10.0, true),
            InteractionKind::PromiseKept => (Positive, 25.0, false),
            InteractionKind::PromiseBroken => (Negative, -40.0, false),
            InteractionKind::Nominated => (Negative, -25.0, false),
            InteractionKind::VetoSaved => (Positive, 35.0, false),
            InteractionKind::VotedAgainst => (Negative, -30.0, true),
            InteractionKind::RumorSpread => (Negative, -10.0, true),
            InteractionKind::Defended => (Positive, 15.0, true),
            InteractionKind::Argument => (Negative, -15.0, true),
        };
        InteractionDefaults {
            sentiment,
            impact,
            decays,
        }
    }

    /// Betrayals permanently dent trust on top of their impact
    pub fn is_betrayal(&self) -> bool {
        matches!(
            self,
            InteractionKind::PromiseBroken | InteractionKind::AllianceBetrayed
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            InteractionKind::Conversation => "conversation",
            InteractionKind::AllianceFormed => "alliance_formed",
            InteractionKind::AllianceMeeting => "alliance_meeting",
            InteractionKind::AllianceBetrayed => "alliance_betrayed",
            InteractionKind::PromiseMade => "promise_made",
            InteractionKind::PromiseKept => "promise_kept",
            InteractionKind::PromiseBroken => "promise_broken",
            InteractionKind::Nominated => "nominated",
            InteractionKind::VetoSaved => "veto_saved",
            InteractionKind::VotedAgainst => "voted_against",
            InteractionKind::RumorSpread => "rumor_spread",
            InteractionKind::Defended => "defended",
            InteractionKind::Argument => "argument",
        }
    }

    /// Returns all interaction kinds.
    pub fn all() -> &'static [InteractionKind] {
        &[
            InteractionKind::Conversation,
            InteractionKind::AllianceFormed,
            InteractionKind::AllianceMeeting,
            InteractionKind::AllianceBetrayed,
            InteractionKind::PromiseMade,
            InteractionKind::PromiseKept,
            InteractionKind::PromiseBroken,
            InteractionKind::Nominated,
            InteractionKind::VetoSaved,
            InteractionKind::VotedAgainst,
            InteractionKind::RumorSpread,
            InteractionKind::Defended,
            InteractionKind::Argument,
        ]
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single ledger record. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub week: Week,
    pub kind: InteractionKind,
    pub from_id: String,
    pub to_id: String,
    pub sentiment: Sentiment,
    /// Always within [-100, 100]
    pub impact: f64,
    pub description: String,
    /// First week after which the impact starts shrinking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decays_at_week: Option<Week>,
    #[serde(default)]
    pub never_decays: bool,
}

impl Interaction {
    /// Impact as seen from `current_week`.
    ///
    /// Past `decays_at_week` the magnitude shrinks geometrically:
    /// `impact * (1 - decay_rate)^weeks_past_decay`.
    pub fn effective_impact(&self, current_week: Week, decay_rate: f64) -> f64 {
        if self.never_decays {
            return self.impact;
        }
        match self.decays_at_week {
            Some(decays_at) if current_week > decays_at => {
                let weeks_past = (current_week - decays_at) as i32;
                self.impact * (1.0 - decay_rate.clamp(0.0, 1.0)).powi(weeks_past)
            }
            _ => self.impact,
        }
    }

    /// True when `from` did this to `to`
    pub fn is_directed(&self, from: &str, to: &str) -> bool {
        self.from_id == from && self.to_id == to
    }

    pub fn involves(&self, agent_id: &str) -> bool {
        self.from_id == agent_id || self.to_id == agent_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: InteractionKind, week: Week, decays_at_week: Option<Week>) -> Interaction {
        let defaults = kind.defaults();
        Interaction {
            id: "int_00000001".to_string(),
            week,
            kind,
            from_id: "b".to_string(),
            to_id: "a".to_string(),
            sentiment: defaults.sentiment,
            impact: defaults.impact,
            description: String::new(),
            decays_at_week,
            never_decays: !defaults.decays,
        }
    }

    #[test]
    fn test_betrayal_kinds_never_decay() {
        for kind in InteractionKind::all() {
            if kind.is_betrayal() {
                assert!(!kind.defaults().decays, "{} should never decay", kind);
            }
        }
    }

    #[test]
    fn test_effective_impact_before_and_after_decay() {
        let chat = sample(InteractionKind::Conversation, 1, Some(3));
        assert_eq!(chat.effective_impact(3, 0.1), 5.0);
        // Two weeks past the decay point: 5 * 0.9^2
        assert!((chat.effective_impact(5, 0.1) - 4.05).abs() < 1e-9);
    }

    #[test]
    fn test_never_decays_is_exempt() {
        let broken = sample(InteractionKind::PromiseBroken, 1, None);
        assert_eq!(broken.effective_impact(100, 0.5), -40.0);
    }

    #[test]
    fn test_sentiment_from_impact() {
        assert_eq!(Sentiment::from_impact(3.0), Sentiment::Positive);
        assert_eq!(Sentiment::from_impact(-0.5), Sentiment::Negative);
        assert_eq!(Sentiment::from_impact(0.0), Sentiment::Neutral);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&InteractionKind::PromiseBroken).unwrap();
        assert_eq!(json, "\"promise_broken\"");
    }
}
