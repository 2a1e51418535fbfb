//! Interaction Ledger
//!
//! Append-only log of typed interactions between agent pairs. Trust is
//! computed on read: entries are never rewritten, and decay is applied from
//! the ledger's current week, so replaying the log reproduces every score.

pub mod checkpoint;

use house_events::{Interaction, InteractionKind, Sentiment, Week};

use crate::config::LedgerConfig;

pub use checkpoint::{CheckpointError, LogRecord};

/// Trust scoring constants
pub mod trust_constants {
    /// Starting trust with no history
    pub const BASELINE: f64 = 50.0;
    /// Cap on the long-term history term, either direction
    pub const HISTORY_CAP: f64 = 40.0;
    /// Cap on the recent-impact bonus
    pub const RECENT_BONUS_CAP: f64 = 10.0;
    /// Cap on the recent-impact penalty
    pub const RECENT_PENALTY_CAP: f64 = 15.0;
    /// Scale applied to both history and recent impact
    pub const IMPACT_SCALE: f64 = 0.5;
    /// Flat penalty per betrayal
    pub const BETRAYAL_PENALTY: f64 = 20.0;
}

/// What one agent's interactions toward another add up to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionSummary {
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    /// Sum of decayed impacts
    pub total_impact: f64,
    /// Sum of undecayed impacts inside the recent window
    pub recent_impact: f64,
    /// Largest absolute decayed impact; earliest wins ties
    pub most_significant_event: Option<Interaction>,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    interactions: Vec<Interaction>,
    current_week: Week,
    config: LedgerConfig,
    next_id: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            interactions: Vec::new(),
            current_week: 1,
            config,
            next_id: 0,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn current_week(&self) -> Week {
        self.current_week
    }

    pub fn set_week(&mut self, week: Week) {
        self.current_week = week;
    }

    pub fn advance_week(&mut self) -> Week {
        self.current_week += 1;
        self.current_week
    }

    /// Appends an interaction stamped with the current week.
    ///
    /// `impact_override` replaces the kind's default impact (clamped to
    /// [-100, 100]) and its sign decides the sentiment.
    pub fn record_interaction(
        &mut self,
        from_id: &str,
        to_id: &str,
        kind: InteractionKind,
        description: impl Into<String>,
        impact_override: Option<f64>,
    ) -> Interaction {
        let defaults = kind.defaults();
        let (impact, sentiment) = match impact_override {
            Some(value) => {
                let impact = value.clamp(-100.0, 100.0);
                (impact, Sentiment::from_impact(impact))
            }
            None => (defaults.impact, defaults.sentiment),
        };

        self.next_id += 1;
        let interaction = Interaction {
            id: format!("int_{:08}", self.next_id),
            week: self.current_week,
            kind,
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            sentiment,
            impact,
            description: description.into(),
            decays_at_week: defaults
                .decays
                .then(|| self.current_week + self.config.decay_delay_weeks),
            never_decays: !defaults.decays,
        };

        tracing::debug!(
            "Ledger week {}: {} -> {} {} ({:+.1})",
            interaction.week,
            interaction.from_id,
            interaction.to_id,
            interaction.kind,
            interaction.impact
        );
        self.interactions.push(interaction.clone());
        interaction
    }

    /// Summarizes what `subject` has done to `observer`.
    ///
    /// Reads interactions with `from_id == subject` and `to_id == observer`.
    /// Swap the arguments to summarize the other direction.
    pub fn summarize(&self, observer: &str, subject: &str) -> InteractionSummary {
        let mut summary = InteractionSummary::default();
        let mut strongest = 0.0_f64;

        for interaction in self.between(subject, observer) {
            match interaction.sentiment {
                Sentiment::Positive => summary.positive_count += 1,
                Sentiment::Negative => summary.negative_count += 1,
                Sentiment::Neutral => summary.neutral_count += 1,
            }

            let effective = interaction.effective_impact(self.current_week, self.config.decay_rate);
            summary.total_impact += effective;

            if self.is_recent(interaction) {
                summary.recent_impact += interaction.impact;
            }

            if summary.most_significant_event.is_none() || effective.abs() > strongest {
                strongest = effective.abs();
                summary.most_significant_event = Some(interaction.clone());
            }
        }

        summary
    }

    /// Trust of `observer` in `subject`, in [0, 100].
    pub fn trust_score(&self, observer: &str, subject: &str) -> f64 {
        use trust_constants::*;

        let summary = self.summarize(observer, subject);
        let history = (summary.total_impact * IMPACT_SCALE).clamp(-HISTORY_CAP, HISTORY_CAP);
        let recent = summary.recent_impact * IMPACT_SCALE;
        let recent = if recent >= 0.0 {
            recent.min(RECENT_BONUS_CAP)
        } else {
            recent.max(-RECENT_PENALTY_CAP)
        };
        let betrayals = self.betrayal_count(observer, subject) as f64;

        (BASELINE + history + recent - BETRAYAL_PENALTY * betrayals).clamp(0.0, 100.0)
    }

    /// Betrayal-class interactions from `subject` aimed at `observer`
    pub fn betrayal_count(&self, observer: &str, subject: &str) -> usize {
        self.between(subject, observer)
            .filter(|i| i.kind.is_betrayal())
            .count()
    }

    /// Interactions `from` directed at `to`, in append order
    pub fn between<'a>(
        &'a self,
        from: &'a str,
        to: &'a str,
    ) -> impl Iterator<Item = &'a Interaction> + 'a {
        self.interactions
            .iter()
            .filter(move |i| i.is_directed(from, to))
    }

    /// Every interaction an agent sent or received, in append order
    pub fn involving<'a>(&'a self, agent_id: &'a str) -> impl Iterator<Item = &'a Interaction> + 'a {
        self.interactions.iter().filter(move |i| i.involves(agent_id))
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    fn is_recent(&self, interaction: &Interaction) -> bool {
        self.current_week.saturating_sub(interaction.week) < self.config.recent_window_weeks
    }

    /// Rebuilds a ledger from checkpointed records, keeping their order
    pub(crate) fn from_parts(
        config: LedgerConfig,
        current_week: Week,
        interactions: Vec<Interaction>,
    ) -> Self {
        let next_id = interactions.len() as u64;
        Self {
            interactions,
            current_week,
            config,
            next_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_at(week: Week) -> Ledger {
        let mut ledger = Ledger::default();
        ledger.set_week(week);
        ledger
    }

    #[test]
    fn test_record_uses_kind_defaults() {
        let mut ledger = ledger_at(1);
        let chat = ledger.record_interaction("bo", "ava", InteractionKind::Conversation, "chat", None);

        assert_eq!(chat.impact, 5.0);
        assert_eq!(chat.sentiment, Sentiment::Positive);
        assert_eq!(chat.decays_at_week, Some(3));
        assert!(!chat.never_decays);
        assert_eq!(chat.id, "int_00000001");
    }

    #[test]
    fn test_override_is_clamped_and_sets_sentiment() {
        let mut ledger = ledger_at(1);
        let odd = ledger.record_interaction("bo", "ava", InteractionKind::Conversation, "heated", Some(-250.0));

        assert_eq!(odd.impact, -100.0);
        assert_eq!(odd.sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_summary_reads_subject_to_observer_only() {
        let mut ledger = ledger_at(1);
        ledger.record_interaction("bo", "ava", InteractionKind::Conversation, "bo to ava", None);
        ledger.record_interaction("ava", "bo", InteractionKind::Argument, "ava to bo", None);

        let ava_on_bo = ledger.summarize("ava", "bo");
        assert_eq!(ava_on_bo.positive_count, 1);
        assert_eq!(ava_on_bo.negative_count, 0);

        let bo_on_ava = ledger.summarize("bo", "ava");
        assert_eq!(bo_on_ava.negative_count, 1);
        assert_eq!(bo_on_ava.total_impact, -15.0);
    }

    #[test]
    fn test_most_significant_event() {
        let mut ledger = ledger_at(1);
        ledger.record_interaction("bo", "ava", InteractionKind::Conversation, "small", None);
        ledger.record_interaction("bo", "ava", InteractionKind::Nominated, "big", None);
        ledger.record_interaction("bo", "ava", InteractionKind::Defended, "medium", None);

        let summary = ledger.summarize("ava", "bo");
        let strongest = summary.most_significant_event.unwrap();
        assert_eq!(strongest.kind, InteractionKind::Nominated);
    }

    #[test]
    fn test_empty_history_is_neutral() {
        let ledger = ledger_at(4);
        assert_eq!(ledger.trust_score("ava", "bo"), 50.0);
        assert!(ledger.summarize("ava", "bo").most_significant_event.is_none());
    }

    #[test]
    fn test_recent_penalty_is_capped_harder_than_bonus() {
        let mut ledger = ledger_at(1);
        for _ in 0..10 {
            ledger.record_interaction("bo", "ava", InteractionKind::Defended, "help", None);
        }
        // history capped at +40, recent capped at +10
        assert_eq!(ledger.trust_score("ava", "bo"), 100.0);

        let mut ledger = ledger_at(1);
        ledger.record_interaction("bo", "ava", InteractionKind::Argument, "fight", None);
        ledger.record_interaction("bo", "ava", InteractionKind::Argument, "fight", None);
        // history -15, recent -15
        assert_eq!(ledger.trust_score("ava", "bo"), 20.0);
    }

    #[test]
    fn test_betrayal_penalty_stacks() {
        let mut ledger = ledger_at(1);
        ledger.record_interaction("bo", "ava", InteractionKind::PromiseBroken, "lied", None);
        ledger.record_interaction("bo", "ava", InteractionKind::AllianceBetrayed, "flipped", None);
        ledger.set_week(10);

        assert_eq!(ledger.betrayal_count("ava", "bo"), 2);
        // 50 - 40 (history cap) - 40 (two betrayals), clamped
        assert_eq!(ledger.trust_score("ava", "bo"), 0.0);
        // the reverse direction is untouched
        assert_eq!(ledger.trust_score("bo", "ava"), 50.0);
    }

    #[test]
    fn test_advance_week() {
        let mut ledger = ledger_at(1);
        assert_eq!(ledger.advance_week(), 2);
        assert_eq!(ledger.current_week(), 2);
    }
}
