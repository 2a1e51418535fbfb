//! Threat Assessor
//!
//! Estimates how dangerous a target is to an evaluator's standing from four
//! capped sub-scores: competition record, house-wide popularity, alliance
//! reach and raw potential.

use serde::Serialize;

use crate::stores::WorldView;

/// Caps and multipliers for threat sub-scores
pub mod threat_constants {
    pub const COMPETITION_CAP: f64 = 40.0;
    pub const SOCIAL_CAP: f64 = 30.0;
    pub const ALLIANCE_CAP: f64 = 20.0;
    pub const POTENTIAL_CAP: f64 = 10.0;
    /// Points per head-of-household win
    pub const HOH_WIN_POINTS: f64 = 8.0;
    /// Points per veto win
    pub const VETO_WIN_POINTS: f64 = 6.0;
    /// Points per member of each alliance the target belongs to
    pub const ALLIANCE_MEMBER_POINTS: f64 = 4.0;
    /// Social sub-score when nobody has an opinion of the target yet
    pub const DEFAULT_SOCIAL: f64 = 15.0;
    /// Bonus for targets with both social and strategic stats at this level
    pub const WELL_ROUNDED_STAT: f64 = 7.0;
    pub const WELL_ROUNDED_BONUS: f64 = 2.0;
    /// A total at or above this is a major threat
    pub const MAJOR_THREAT_TOTAL: f64 = 50.0;
    /// This many HoH wins makes a major threat regardless of total
    pub const MAJOR_THREAT_HOH_WINS: u32 = 2;
}

use threat_constants::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ThreatBreakdown {
    /// [0, 40]
    pub competition: f64,
    /// [0, 30]
    pub social: f64,
    /// [0, 20]
    pub alliance: f64,
    /// [0, 10]
    pub potential: f64,
    /// [0, 100]
    pub total: f64,
}

/// Breaks down how threatening `target` is. Unknown targets score zero.
///
/// Sub-scores are house-wide, so the evaluator only matters for logging;
/// it is kept in the signature so callers read naturally.
pub fn threat_breakdown(evaluator: &str, target: &str, world: &WorldView<'_>) -> ThreatBreakdown {
    let Some(agent) = world.roster.agent(target) else {
        tracing::debug!("{} assessed unknown target {}", evaluator, target);
        return ThreatBreakdown::default();
    };

    let competition = (HOH_WIN_POINTS * agent.record.hoh_wins as f64
        + VETO_WIN_POINTS * agent.record.veto_wins as f64)
        .min(COMPETITION_CAP);

    let social = social_standing(target, world);

    let alliance = world
        .alliances
        .list_for_agent(target)
        .iter()
        .map(|a| ALLIANCE_MEMBER_POINTS * a.member_count() as f64)
        .sum::<f64>()
        .min(ALLIANCE_CAP);

    let stats = &agent.stats;
    let well_rounded = if stats.social >= WELL_ROUNDED_STAT && stats.strategic >= WELL_ROUNDED_STAT {
        WELL_ROUNDED_BONUS
    } else {
        0.0
    };
    let potential = (0.3 * stats.competition + 0.2 * stats.strategic + well_rounded)
        .clamp(0.0, POTENTIAL_CAP);

    let total = (competition + social + alliance + potential).min(100.0);

    ThreatBreakdown {
        competition,
        social,
        alliance,
        potential,
        total,
    }
}

pub fn threat_level(evaluator: &str, target: &str, world: &WorldView<'_>) -> f64 {
    threat_breakdown(evaluator, target, world).total
}

/// Major threats have a total of 50 or more, or at least two HoH wins
pub fn is_major_threat(evaluator: &str, target: &str, world: &WorldView<'_>) -> bool {
    let many_wins = world
        .roster
        .agent(target)
        .is_some_and(|a| a.record.hoh_wins >= MAJOR_THREAT_HOH_WINS);
    many_wins || threat_level(evaluator, target, world) >= MAJOR_THREAT_TOTAL
}

/// Mean opinion of the house toward `target`, remapped from [-100, 100] to [0, 30]
fn social_standing(target: &str, world: &WorldView<'_>) -> f64 {
    let scores: Vec<f64> = world
        .roster
        .active_agents()
        .iter()
        .filter(|a| a.id != target)
        .filter_map(|a| world.relationships.score(&a.id, target))
        .map(|s| s.clamp(-100.0, 100.0))
        .collect();

    if scores.is_empty() {
        return DEFAULT_SOCIAL;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    (mean + 100.0) / 200.0 * SOCIAL_CAP
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{AllianceStore, HouseState};
    use house_events::{AbilityStats, Agent};

    fn house() -> HouseState {
        HouseState::new(vec![
            Agent::new("ava", "Ava"),
            Agent::new("bo", "Bo")
                .with_record(3, 2)
                .with_stats(AbilityStats::new(10.0, 8.0, 9.0, 5.0)),
            Agent::new("cy", "Cy"),
            Agent::new("dee", "Dee"),
        ])
    }

    #[test]
    fn test_unknown_target_is_harmless() {
        let state = house();
        assert_eq!(threat_breakdown("ava", "ghost", &state.view()), ThreatBreakdown::default());
    }

    #[test]
    fn test_social_defaults_without_opinions() {
        let state = house();
        let breakdown = threat_breakdown("ava", "cy", &state.view());
        assert_eq!(breakdown.social, DEFAULT_SOCIAL);
        assert_eq!(breakdown.competition, 0.0);
    }

    #[test]
    fn test_sub_scores_are_capped() {
        let mut state = house();
        state.relationships.set("ava", "bo", 100.0);
        state.relationships.set("cy", "bo", 100.0);
        for name in ["One", "Two", "Three"] {
            state.alliances.create(
                name,
                vec!["bo".into(), "ava".into(), "cy".into()],
                "bo",
                false,
                1,
            );
        }

        let breakdown = threat_breakdown("ava", "bo", &state.view());
        // 8*3 + 6*2 = 36
        assert_eq!(breakdown.competition, 36.0);
        assert_eq!(breakdown.social, 30.0);
        assert_eq!(breakdown.alliance, 20.0);
        // 3.0 + 1.8 + 2.0
        assert!((breakdown.potential - 6.8).abs() < 1e-9);
        assert!(breakdown.total <= 100.0);
        assert!(is_major_threat("ava", "bo", &state.view()));
    }

    #[test]
    fn test_social_ignores_evicted_opinions() {
        let mut state = house();
        state.relationships.set("cy", "dee", -100.0);
        state.relationships.set("ava", "dee", 100.0);
        state.roster.evict("cy", false);

        assert_eq!(threat_breakdown("bo", "dee", &state.view()).social, 30.0);
    }

    #[test]
    fn test_two_hoh_wins_is_major_even_when_quiet() {
        let mut state = house();
        if let Some(agent) = state.roster.agent_mut("cy") {
            agent.record.hoh_wins = 2;
        }
        assert!(threat_level("ava", "cy", &state.view()) < MAJOR_THREAT_TOTAL);
        assert!(is_major_threat("ava", "cy", &state.view()));
    }

    #[test]
    fn test_breakdown_is_pure() {
        let mut state = house();
        state.relationships.set("ava", "bo", 12.0);
        let first = threat_breakdown("ava", "bo", &state.view());
        let second = threat_breakdown("ava", "bo", &state.view());
        assert_eq!(first, second);
    }
}
