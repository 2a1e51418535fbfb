//! Season setup: the sample cast and their opening impressions.

use house_core::{HouseState, Roster};
use house_events::{AbilityStats, Agent};
use rand::Rng;

/// Opening relationships fall in this range
const FIRST_IMPRESSION: std::ops::RangeInclusive<f64> = -15.0..=25.0;

pub fn sample_cast() -> Vec<Agent> {
    vec![
        Agent::new("ava", "Ava")
            .with_traits(["Strategic", "Competitive"])
            .with_stats(AbilityStats::new(7.0, 5.0, 8.0, 6.0)),
        Agent::new("bo", "Bo")
            .with_traits(["Loyal", "Social"])
            .with_stats(AbilityStats::new(4.0, 8.0, 5.0, 5.0)),
        Agent::new("cy", "Cy")
            .with_traits(["Confrontational"])
            .with_stats(AbilityStats::new(8.0, 3.0, 4.0, 9.0)),
        Agent::new("di", "Di")
            .with_traits(["Floater", "Emotional"])
            .with_stats(AbilityStats::new(3.0, 7.0, 3.0, 4.0)),
        Agent::new("ezra", "Ezra")
            .with_traits(["Sneaky", "Strategic"])
            .with_stats(AbilityStats::new(5.0, 6.0, 9.0, 4.0)),
        Agent::new("fern", "Fern")
            .with_traits(["Loyal"])
            .with_stats(AbilityStats::new(6.0, 6.0, 6.0, 6.0)),
        Agent::new("gus", "Gus")
            .with_traits(["Competitive", "Confrontational"])
            .with_stats(AbilityStats::new(9.0, 2.0, 5.0, 8.0)),
        Agent::new("hana", "Hana")
            .with_traits(["Social", "Emotional"])
            .with_stats(AbilityStats::new(4.0, 9.0, 6.0, 3.0)),
    ]
}

/// Gives every pair a random opening impression in both directions
pub fn seed_relationships<R: Rng + ?Sized>(state: &mut HouseState, rng: &mut R) {
    let ids: Vec<String> = state
        .roster
        .agents()
        .iter()
        .map(|a| a.id.clone())
        .collect();
    for from in &ids {
        for to in ids.iter().filter(|to| *to != from) {
            state
                .relationships
                .set(from, to, rng.gen_range(FIRST_IMPRESSION).round());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use house_core::RelationshipStore;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_cast_ids_are_unique() {
        let cast = sample_cast();
        let mut ids: Vec<&str> = cast.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), cast.len());
    }

    #[test]
    fn test_every_pair_has_an_impression() {
        let mut state = HouseState::new(sample_cast());
        seed_relationships(&mut state, &mut SmallRng::seed_from_u64(42));

        let score = state.relationships.score("ava", "hana").unwrap();
        assert!(FIRST_IMPRESSION.contains(&score));
        assert!(state.relationships.score("ava", "ava").is_none());
    }
}
