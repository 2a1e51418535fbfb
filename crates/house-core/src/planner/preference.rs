//! Trait-driven action preferences.

use house_events::{Agent, NpcActionKind};

use NpcActionKind::*;

/// Ordered action preferences for a trait tag, most preferred first
pub fn trait_preferences(tag: &str) -> &'static [NpcActionKind] {
    match tag.trim().to_ascii_lowercase().as_str() {
        "strategic" => &[AlliancePropose, Promise, AllianceMeeting],
        "social" => &[Talk, AllianceMeeting, AlliancePropose],
        "loyal" => &[AllianceMeeting, Promise, Talk],
        "sneaky" => &[SpreadInfo, Promise, AlliancePropose],
        "manipulative" => &[SpreadInfo, Promise, Talk],
        "competitive" => &[AlliancePropose, Talk],
        "emotional" => &[Talk, SpreadInfo],
        "confrontational" => &[SpreadInfo, Talk],
        "floater" => &[Talk, AllianceMeeting],
        _ => &[],
    }
}

/// The agent's top preference list: that of its first tag with one
pub fn preferred_actions(agent: &Agent) -> &'static [NpcActionKind] {
    agent
        .traits
        .iter()
        .map(|t| trait_preferences(t))
        .find(|prefs| !prefs.is_empty())
        .unwrap_or(&[])
}

/// +10 / +5 / +2 for the first three preferred kinds
pub fn preference_bonus(agent: &Agent, kind: NpcActionKind) -> f64 {
    const BONUSES: [f64; 3] = [10.0, 5.0, 2.0];
    preferred_actions(agent)
        .iter()
        .take(BONUSES.len())
        .position(|k| *k == kind)
        .map_or(0.0, |index| BONUSES[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_known_trait_wins() {
        let agent = Agent::new("ava", "Ava").with_traits(["Analytical", "Sneaky", "Social"]);
        assert_eq!(preferred_actions(&agent)[0], SpreadInfo);
        assert_eq!(preference_bonus(&agent, SpreadInfo), 10.0);
        assert_eq!(preference_bonus(&agent, Promise), 5.0);
        assert_eq!(preference_bonus(&agent, AlliancePropose), 2.0);
        assert_eq!(preference_bonus(&agent, Talk), 0.0);
    }

    #[test]
    fn test_no_known_traits_means_no_bonus() {
        let agent = Agent::new("ava", "Ava").with_traits(["Analytical"]);
        assert!(preferred_actions(&agent).is_empty());
        assert_eq!(preference_bonus(&agent, Talk), 0.0);
    }
}
