//! Decision Factor Engine
//!
//! Combines relationship, threat, alliance loyalty, reciprocity, pledge
//! obligations, strategic value and personality bias into one score per
//! (evaluator, target) pair. Lower scores mark likelier targets for
//! nomination and eviction.

pub mod weights;

use house_events::{Agent, PledgeKind, PledgeStatus};
use serde::Serialize;

use crate::config::BaseWeights;
use crate::stores::WorldView;
use crate::threat::threat_level;

pub use weights::{trait_modifier, trait_weights, TraitWeights, WeightModifier};

/// Factor ranges and point values
pub mod factor_constants {
    pub const ALLIANCE_SIZE_POINTS: f64 = 10.0;
    pub const ALLIANCE_PER_GROUP_CAP: f64 = 50.0;
    /// Bonus for alliances of this size or smaller
    pub const SMALL_ALLIANCE_SIZE: usize = 3;
    pub const SMALL_ALLIANCE_BONUS: f64 = 20.0;
    pub const LOYALTY_CAP: f64 = 100.0;

    pub const RECEIVED_PLEDGE_POINTS: f64 = 10.0;
    pub const BROKEN_PLEDGE_PENALTY: f64 = 25.0;
    pub const PLEDGE_CAP: f64 = 30.0;

    pub const STRATEGIC_BASE: f64 = 50.0;
    pub const OUT_WINNING_BONUS: f64 = 15.0;
    pub const STRONG_COMPETITOR_STAT: f64 = 7.0;
    pub const STRONG_COMPETITOR_BONUS: f64 = 10.0;
    pub const SOCIAL_BUTTERFLY_STAT: f64 = 8.0;
    pub const SOCIAL_BUTTERFLY_PENALTY: f64 = 10.0;

    pub const SHARED_TRAIT_POINTS: f64 = 5.0;
    pub const OPPOSED_TRAIT_PENALTY: f64 = 5.0;
    pub const BIAS_CAP: f64 = 20.0;

    pub const RECENT_EVENTS_CAP: f64 = 50.0;
    /// Reciprocity below this discounts a positive relationship
    pub const ONE_SIDED_RECIPROCITY: f64 = -0.3;
}

use factor_constants::*;

/// Trait pairs that clash
pub const OPPOSING_TRAITS: &[(&str, &str)] = &[
    ("Loyal", "Sneaky"),
    ("Confrontational", "Floater"),
    ("Strategic", "Emotional"),
    ("Competitive", "Social"),
];

/// Inputs to a single score, recomputed on every call
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DecisionFactors {
    /// [-100, 100]
    pub relationship: f64,
    /// [0, 100]
    pub threat_level: f64,
    /// [0, 100]
    pub alliance_loyalty: f64,
    /// [-1, 1]
    pub reciprocity: f64,
    /// [-50, 50]
    pub recent_events: f64,
    /// [-20, 20]
    pub personality_bias: f64,
    /// [0, 100]
    pub strategic_value: f64,
    /// [-30, 30]
    pub pledge_obligations: f64,
}

/// A scored candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTarget {
    pub target_id: String,
    pub score: f64,
    pub factors: DecisionFactors,
}

/// Composite score; lower means the evaluator cares less about the target
pub fn score(factors: &DecisionFactors, weights: &TraitWeights) -> f64 {
    let mut relationship = factors.relationship * weights.relationship;
    if factors.relationship > 0.0 && factors.reciprocity < ONE_SIDED_RECIPROCITY {
        relationship *= 1.0 + factors.reciprocity * 0.5;
    }

    relationship - factors.threat_level * weights.threat
        + factors.alliance_loyalty * weights.loyalty
        + factors.pledge_obligations * weights.pledge
        + factors.strategic_value * weights.strategic * 0.5
        + factors.personality_bias
}

#[derive(Debug, Clone, Default)]
pub struct FactorEngine {
    base: BaseWeights,
}

impl FactorEngine {
    pub fn new(base: BaseWeights) -> Self {
        Self { base }
    }

    pub fn base_weights(&self) -> &BaseWeights {
        &self.base
    }

    pub fn trait_weights<S: AsRef<str>>(&self, tags: &[S]) -> TraitWeights {
        trait_weights(tags, &self.base)
    }

    /// Weights for a roster agent; base weights when the agent is unknown
    pub fn weights_for(&self, agent_id: &str, world: &WorldView<'_>) -> TraitWeights {
        match world.roster.agent(agent_id) {
            Some(agent) => self.trait_weights(&agent.traits),
            None => self.trait_weights::<&str>(&[]),
        }
    }

    pub fn factors(&self, evaluator: &str, target: &str, world: &WorldView<'_>) -> DecisionFactors {
        let evaluator_agent = world.roster.agent(evaluator);
        let target_agent = world.roster.agent(target);

        let recent_events = world.ledger.map_or(0.0, |ledger| {
            ledger
                .summarize(evaluator, target)
                .recent_impact
                .clamp(-RECENT_EVENTS_CAP, RECENT_EVENTS_CAP)
        });

        DecisionFactors {
            relationship: world.relationship(evaluator, target),
            threat_level: threat_level(evaluator, target, world),
            alliance_loyalty: alliance_loyalty(evaluator, target, world),
            reciprocity: world.relationships.reciprocity(evaluator, target).clamp(-1.0, 1.0),
            recent_events,
            personality_bias: match (evaluator_agent, target_agent) {
                (Some(e), Some(t)) => personality_bias(e, t),
                _ => 0.0,
            },
            strategic_value: strategic_value(evaluator_agent, target_agent),
            pledge_obligations: pledge_obligations(evaluator, target, world),
        }
    }

    pub fn score_target(&self, evaluator: &str, target: &str, world: &WorldView<'_>) -> f64 {
        let weights = self.weights_for(evaluator, world);
        score(&self.factors(evaluator, target, world), &weights)
    }

    /// Targets in ascending score order. Ties keep input order.
    pub fn rank<S: AsRef<str>>(
        &self,
        evaluator: &str,
        targets: &[S],
        world: &WorldView<'_>,
    ) -> Vec<RankedTarget> {
        let weights = self.weights_for(evaluator, world);
        let mut ranked: Vec<RankedTarget> = targets
            .iter()
            .map(|target| {
                let factors = self.factors(evaluator, target.as_ref(), world);
                RankedTarget {
                    target_id: target.as_ref().to_string(),
                    score: score(&factors, &weights),
                    factors,
                }
            })
            .collect();
        ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
        ranked
    }
}

/// Shared-alliance strength between two agents, [0, 100]
pub fn alliance_loyalty(evaluator: &str, target: &str, world: &WorldView<'_>) -> f64 {
    world
        .alliances
        .list_for_agent(evaluator)
        .iter()
        .filter(|a| a.contains(target))
        .map(|a| {
            let size = a.member_count();
            let mut points = (ALLIANCE_SIZE_POINTS * size as f64).min(ALLIANCE_PER_GROUP_CAP);
            if size <= SMALL_ALLIANCE_SIZE {
                points += SMALL_ALLIANCE_BONUS;
            }
            points
        })
        .sum::<f64>()
        .min(LOYALTY_CAP)
}

fn pledge_points(kind: PledgeKind) -> f64 {
    match kind {
        PledgeKind::Safety => 30.0,
        PledgeKind::Vote => 20.0,
        PledgeKind::AllianceLoyalty => 15.0,
        _ => 10.0,
    }
}

/// What the evaluator owes the target, net of what the target did, [-30, 30]
pub fn pledge_obligations(evaluator: &str, target: &str, world: &WorldView<'_>) -> f64 {
    let pledges = world.pledges.list_all();

    let owed: f64 = pledges
        .iter()
        .filter(|p| p.from_id == evaluator && p.to_id == target && p.is_active())
        .map(|p| pledge_points(p.kind))
        .sum();

    let from_target = pledges
        .iter()
        .filter(|p| p.from_id == target && p.to_id == evaluator);

    let mut total = owed;
    if from_target.clone().any(|p| p.is_active()) {
        total += RECEIVED_PLEDGE_POINTS;
    }
    if from_target.clone().any(|p| p.status == PledgeStatus::Broken) {
        total -= BROKEN_PLEDGE_PENALTY;
    }
    total.clamp(-PLEDGE_CAP, PLEDGE_CAP)
}

/// How useful the target is to keep around, [0, 100]
pub fn strategic_value(evaluator: Option<&Agent>, target: Option<&Agent>) -> f64 {
    let Some(target) = target else {
        return STRATEGIC_BASE;
    };
    let mut value = STRATEGIC_BASE;
    let evaluator_wins = evaluator.map_or(0, |e| e.record.total());
    if target.record.total() > evaluator_wins {
        value += OUT_WINNING_BONUS;
    }
    if target.stats.competition >= STRONG_COMPETITOR_STAT {
        value += STRONG_COMPETITOR_BONUS;
    }
    if target.stats.social >= SOCIAL_BUTTERFLY_STAT {
        value -= SOCIAL_BUTTERFLY_PENALTY;
    }
    value.clamp(0.0, 100.0)
}

/// Shared tags pull together, opposing pairs push apart, [-20, 20]
pub fn personality_bias(evaluator: &Agent, target: &Agent) -> f64 {
    let shared = evaluator
        .traits
        .iter()
        .filter(|t| target.has_trait(t))
        .count() as f64;

    let opposed = OPPOSING_TRAITS
        .iter()
        .filter(|(a, b)| {
            (evaluator.has_trait(a) && target.has_trait(b))
                || (evaluator.has_trait(b) && target.has_trait(a))
        })
        .count() as f64;

    (SHARED_TRAIT_POINTS * shared - OPPOSED_TRAIT_PENALTY * opposed).clamp(-BIAS_CAP, BIAS_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{AllianceStore, HouseState, PledgeStore, Roster};
    use house_events::{AbilityStats, InteractionKind};

    fn house() -> HouseState {
        HouseState::new(vec![
            Agent::new("ava", "Ava").with_traits(["Loyal", "Social"]),
            Agent::new("bo", "Bo").with_traits(["Sneaky", "Social"]),
            Agent::new("cy", "Cy").with_traits(["Loyal"]),
            Agent::new("dee", "Dee"),
        ])
    }

    fn in_range(f: &DecisionFactors) -> bool {
        (-100.0..=100.0).contains(&f.relationship)
            && (0.0..=100.0).contains(&f.threat_level)
            && (0.0..=100.0).contains(&f.alliance_loyalty)
            && (-1.0..=1.0).contains(&f.reciprocity)
            && (-50.0..=50.0).contains(&f.recent_events)
            && (-20.0..=20.0).contains(&f.personality_bias)
            && (0.0..=100.0).contains(&f.strategic_value)
            && (-30.0..=30.0).contains(&f.pledge_obligations)
    }

    #[test]
    fn test_extreme_store_values_are_clamped() {
        let mut state = house();
        state.relationships.set("ava", "bo", 10_000.0);
        state.relationships.set("bo", "ava", -10_000.0);
        for _ in 0..20 {
            state.ledger.record_interaction("bo", "ava", InteractionKind::VetoSaved, "save", None);
        }
        for _ in 0..5 {
            state.pledges.create("ava", "bo", PledgeKind::Safety, "safe", 1);
        }

        let engine = FactorEngine::default();
        let factors = engine.factors("ava", "bo", &state.view());
        assert!(in_range(&factors), "{:?}", factors);
        assert_eq!(factors.relationship, 100.0);
        assert_eq!(factors.reciprocity, -1.0);
        assert_eq!(factors.recent_events, 50.0);
        assert_eq!(factors.pledge_obligations, 30.0);
    }

    #[test]
    fn test_alliance_loyalty_rewards_small_groups() {
        let mut state = house();
        state
            .alliances
            .create("Pair", vec!["ava".into(), "bo".into()], "ava", false, 1);
        state.alliances.create(
            "Big",
            vec!["ava".into(), "bo".into(), "cy".into(), "dee".into()],
            "ava",
            false,
            1,
        );

        // pair: 20 + 20, big: 40
        assert_eq!(alliance_loyalty("ava", "bo", &state.view()), 80.0);
        assert_eq!(alliance_loyalty("cy", "dee", &state.view()), 40.0);
        assert_eq!(alliance_loyalty("cy", "ghost", &state.view()), 0.0);
    }

    #[test]
    fn test_pledge_obligations_net_out() {
        let mut state = house();
        state.pledges.create("ava", "bo", PledgeKind::Vote, "vote", 1);
        let broken = state.pledges.create("bo", "ava", PledgeKind::Safety, "safe", 1);
        state.pledges.set_status(&broken.id, PledgeStatus::Broken);

        // 20 - 25
        assert_eq!(pledge_obligations("ava", "bo", &state.view()), -5.0);

        state.pledges.create("bo", "ava", PledgeKind::Information, "intel", 2);
        assert_eq!(pledge_obligations("ava", "bo", &state.view()), 5.0);
    }

    #[test]
    fn test_personality_bias() {
        let state = house();
        let agent = |id: &str| state.roster.agent(id).cloned().unwrap();

        // shared Social, opposed Loyal/Sneaky
        assert_eq!(personality_bias(&agent("ava"), &agent("bo")), 0.0);
        assert_eq!(personality_bias(&agent("ava"), &agent("cy")), 5.0);
    }

    #[test]
    fn test_strategic_value() {
        let evaluator = Agent::new("ava", "Ava").with_record(1, 0);
        let target = Agent::new("bo", "Bo")
            .with_record(1, 1)
            .with_stats(AbilityStats::new(8.0, 9.0, 5.0, 5.0));
        // 50 + 15 + 10 - 10
        assert_eq!(strategic_value(Some(&evaluator), Some(&target)), 65.0);
        assert_eq!(strategic_value(Some(&evaluator), None), 50.0);
    }

    #[test]
    fn test_one_sided_affection_is_discounted() {
        let weights = trait_weights::<&str>(&[], &BaseWeights::default());
        let mutual = DecisionFactors {
            relationship: 60.0,
            reciprocity: 0.0,
            ..Default::default()
        };
        let one_sided = DecisionFactors {
            reciprocity: -0.8,
            ..mutual
        };
        // 60 * 0.3 = 18, then * 0.6
        assert!((score(&mutual, &weights) - 18.0).abs() < 1e-9);
        assert!((score(&one_sided, &weights) - 10.8).abs() < 1e-9);
    }

    #[test]
    fn test_loyal_ranks_hostile_threat_first() {
        let weights = trait_weights(&["Loyal"], &BaseWeights::default());
        let friend = DecisionFactors {
            relationship: 40.0,
            threat_level: 10.0,
            ..Default::default()
        };
        let rival = DecisionFactors {
            relationship: -10.0,
            threat_level: 60.0,
            ..Default::default()
        };
        // 40*0.24 - 10*0.12 = 8.4 ; -10*0.24 - 60*0.12 = -9.6
        assert!((score(&friend, &weights) - 8.4).abs() < 1e-9);
        assert!((score(&rival, &weights) + 9.6).abs() < 1e-9);
    }

    #[test]
    fn test_rank_is_stable_and_deterministic() {
        let state = house();
        let engine = FactorEngine::default();
        let first = engine.rank("ava", &["dee", "bo", "cy"], &state.view());
        let second = engine.rank("ava", &["dee", "bo", "cy"], &state.view());
        assert_eq!(first, second);

        // with no opinions and no traits, bo and cy score the same
        let tied = engine.rank("dee", &["bo", "cy"], &state.view());
        assert_eq!(tied[0].score, tied[1].score);
        assert_eq!(tied[0].target_id, "bo");
    }
}
