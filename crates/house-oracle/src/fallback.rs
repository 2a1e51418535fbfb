//! Heuristic Fallback
//!
//! Local decisions used whenever the external call is skipped or fails.
//! When the deciding agent is on the roster the choice follows the factor
//! ranking; otherwise it is uniform over the candidates. Every decision is
//! shaped for its type, so an empty candidate list still yields a usable
//! placeholder.

use house_core::{FactorEngine, RankedTarget, WorldView};
use house_events::{Decision, DecisionContext, DecisionType};
use rand::prelude::*;

const CANNED_LINES: &[&str] = &[
    "I'm just trying to take it one day at a time.",
    "Honestly, I think we're all playing the same game here.",
    "You know where I stand. Nothing has changed.",
    "Let's talk later when fewer people are around.",
    "I'm keeping my options open this week.",
];

const FALLBACK_REASONING: &str = "Decided on instinct";

#[derive(Debug, Clone)]
pub struct FallbackGenerator {
    engine: FactorEngine,
    veto_threshold: f64,
}

impl FallbackGenerator {
    pub fn new(engine: FactorEngine, veto_threshold: f64) -> Self {
        Self {
            engine,
            veto_threshold,
        }
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        agent_id: &str,
        decision_type: DecisionType,
        context: &DecisionContext,
        world: Option<&WorldView<'_>>,
        rng: &mut R,
    ) -> Decision {
        let informed = world.filter(|w| w.roster.agent(agent_id).is_some());
        if world.is_some() && informed.is_none() {
            tracing::error!("Fallback for unknown agent {}, choosing at random", agent_id);
        }

        match decision_type {
            DecisionType::Nomination => self.nomination(agent_id, context, informed, rng),
            DecisionType::Veto => self.veto(agent_id, context, informed, rng),
            DecisionType::Replacement => self.replacement(agent_id, context, informed, rng),
            DecisionType::EvictionVote => self.eviction_vote(agent_id, context, informed, rng),
            DecisionType::JuryVote => self.jury_vote(agent_id, context, informed, rng),
            DecisionType::Dialogue => Decision::Dialogue {
                message: CANNED_LINES
                    .choose(rng)
                    .copied()
                    .unwrap_or("...")
                    .to_string(),
                reasoning: FALLBACK_REASONING.to_string(),
            },
        }
    }

    fn ranked(&self, agent_id: &str, candidates: &[String], world: &WorldView<'_>) -> Vec<RankedTarget> {
        self.engine.rank(agent_id, candidates, world)
    }

    fn nomination<R: Rng + ?Sized>(
        &self,
        agent_id: &str,
        context: &DecisionContext,
        world: Option<&WorldView<'_>>,
        rng: &mut R,
    ) -> Decision {
        let eligible = others(agent_id, &context.eligible);
        if eligible.is_empty() {
            tracing::error!("{} has nobody eligible to nominate", agent_id);
            return Decision::Nomination {
                nominees: Vec::new(),
                reasoning: "No eligible houseguests".to_string(),
            };
        }

        let (nominees, reasoning) = match world {
            Some(world) => (
                self.ranked(agent_id, &eligible, world)
                    .into_iter()
                    .take(2)
                    .map(|r| r.target_id)
                    .collect(),
                "Nominated the houseguests I trust least".to_string(),
            ),
            None => (
                eligible.choose_multiple(rng, 2).cloned().collect(),
                FALLBACK_REASONING.to_string(),
            ),
        };
        Decision::Nomination { nominees, reasoning }
    }

    fn veto<R: Rng + ?Sized>(
        &self,
        agent_id: &str,
        context: &DecisionContext,
        world: Option<&WorldView<'_>>,
        rng: &mut R,
    ) -> Decision {
        if context.nominees.is_empty() {
            tracing::error!("Veto decision for {} with nobody on the block", agent_id);
            return Decision::Veto {
                use_veto: false,
                save_nominee: None,
                reasoning: "Nobody to save".to_string(),
            };
        }
        if context.nominees.iter().any(|n| n == agent_id) {
            return Decision::Veto {
                use_veto: true,
                save_nominee: Some(agent_id.to_string()),
                reasoning: "Saving myself".to_string(),
            };
        }

        match world {
            Some(world) => {
                let best = context
                    .nominees
                    .iter()
                    .map(|n| (n, world.relationship(agent_id, n)))
                    .fold(None::<(&String, f64)>, |best, (n, score)| match best {
                        Some((_, top)) if top >= score => best,
                        _ => Some((n, score)),
                    });
                match best {
                    Some((nominee, score)) if score > self.veto_threshold => Decision::Veto {
                        use_veto: true,
                        save_nominee: Some(nominee.clone()),
                        reasoning: format!("{} is someone I can count on", nominee),
                    },
                    _ => Decision::Veto {
                        use_veto: false,
                        save_nominee: None,
                        reasoning: "Keeping nominations the same".to_string(),
                    },
                }
            }
            None => {
                let save_nominee = if rng.gen_bool(0.5) {
                    context.nominees.choose(rng).cloned()
                } else {
                    None
                };
                Decision::Veto {
                    use_veto: save_nominee.is_some(),
                    save_nominee,
                    reasoning: FALLBACK_REASONING.to_string(),
                }
            }
        }
    }

    fn replacement<R: Rng + ?Sized>(
        &self,
        agent_id: &str,
        context: &DecisionContext,
        world: Option<&WorldView<'_>>,
        rng: &mut R,
    ) -> Decision {
        let open: Vec<String> = context
            .eligible
            .iter()
            .filter(|e| !context.nominees.contains(e))
            .cloned()
            .collect();
        if open.is_empty() {
            tracing::error!("{} has nobody eligible as a replacement nominee", agent_id);
            return Decision::Replacement {
                nominee: None,
                reasoning: "No eligible replacement".to_string(),
            };
        }

        let nominee = match world {
            Some(world) => self
                .ranked(agent_id, &open, world)
                .into_iter()
                .next()
                .map(|r| r.target_id),
            None => open.choose(rng).cloned(),
        };
        Decision::Replacement {
            nominee,
            reasoning: FALLBACK_REASONING.to_string(),
        }
    }

    fn eviction_vote<R: Rng + ?Sized>(
        &self,
        agent_id: &str,
        context: &DecisionContext,
        world: Option<&WorldView<'_>>,
        rng: &mut R,
    ) -> Decision {
        if context.nominees.is_empty() {
            tracing::error!("{} asked to vote with nobody on the block", agent_id);
            return Decision::EvictionVote {
                vote_to_evict: None,
                reasoning: "Nobody to vote for".to_string(),
            };
        }

        let vote_to_evict = match world {
            Some(world) => self
                .ranked(agent_id, &context.nominees, world)
                .into_iter()
                .next()
                .map(|r| r.target_id),
            None => context.nominees.choose(rng).cloned(),
        };
        Decision::EvictionVote {
            vote_to_evict,
            reasoning: FALLBACK_REASONING.to_string(),
        }
    }

    fn jury_vote<R: Rng + ?Sized>(
        &self,
        agent_id: &str,
        context: &DecisionContext,
        world: Option<&WorldView<'_>>,
        rng: &mut R,
    ) -> Decision {
        if context.finalists.is_empty() {
            tracing::error!("{} asked for a jury vote with no finalists", agent_id);
            return Decision::JuryVote {
                winner: None,
                reasoning: "No finalists".to_string(),
            };
        }

        let winner = match world {
            Some(world) => self
                .ranked(agent_id, &context.finalists, world)
                .into_iter()
                .last()
                .map(|r| r.target_id),
            None => context.finalists.choose(rng).cloned(),
        };
        Decision::JuryVote {
            winner,
            reasoning: FALLBACK_REASONING.to_string(),
        }
    }
}

/// Candidates other than the decider, first occurrence kept
fn others(agent_id: &str, candidates: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate != agent_id && !seen.contains(candidate) {
            seen.push(candidate.clone());
        }
    }
    seen
}

impl Default for FallbackGenerator {
    fn default() -> Self {
        Self::new(FactorEngine::default(), 50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use house_core::HouseState;
    use house_events::Agent;
    use rand::rngs::SmallRng;

    fn house() -> HouseState {
        HouseState::new(vec![
            Agent::new("ava", "Ava"),
            Agent::new("bo", "Bo"),
            Agent::new("cy", "Cy"),
            Agent::new("di", "Di"),
        ])
    }

    #[test]
    fn test_informed_nomination_picks_least_liked() {
        let mut state = house();
        state.relationships.set("ava", "bo", -60.0);
        state.relationships.set("ava", "cy", 70.0);
        state.relationships.set("ava", "di", -20.0);
        let context = DecisionContext::new().with_eligible(["bo", "cy", "di"]);
        let mut rng = SmallRng::seed_from_u64(1);

        let view = state.view();
        let decision = FallbackGenerator::default().generate(
            "ava",
            DecisionType::Nomination,
            &context,
            Some(&view),
            &mut rng,
        );
        match decision {
            Decision::Nomination { nominees, .. } => assert_eq!(nominees, vec!["bo", "di"]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_nomination_skips_self_and_duplicates() {
        let generator = FallbackGenerator::default();
        let context = DecisionContext::new().with_eligible(["ava", "bo", "bo", "ava", "cy"]);
        let mut rng = SmallRng::seed_from_u64(4);

        for _ in 0..50 {
            let Decision::Nomination { nominees, .. } =
                generator.generate("ava", DecisionType::Nomination, &context, None, &mut rng)
            else {
                panic!("expected a nomination");
            };
            assert_eq!(nominees.len(), 2);
            assert_ne!(nominees[0], nominees[1]);
            assert!(nominees.iter().all(|n| n == "bo" || n == "cy"));
        }

        let state = house();
        let view = state.view();
        let Decision::Nomination { nominees, .. } =
            generator.generate("ava", DecisionType::Nomination, &context, Some(&view), &mut rng)
        else {
            panic!("expected a nomination");
        };
        let mut sorted = nominees.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["bo", "cy"]);
    }

    #[test]
    fn test_only_self_eligible_is_a_placeholder() {
        let context = DecisionContext::new().with_eligible(["ava", "ava"]);
        let mut rng = SmallRng::seed_from_u64(4);
        let decision =
            FallbackGenerator::default().generate("ava", DecisionType::Nomination, &context, None, &mut rng);
        assert!(matches!(decision, Decision::Nomination { ref nominees, .. } if nominees.is_empty()));
    }

    #[test]
    fn test_veto_saves_self_then_friend() {
        let mut state = house();
        state.relationships.set("ava", "cy", 75.0);
        let generator = FallbackGenerator::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let view = state.view();

        let on_block = DecisionContext::new().with_nominees(["ava", "bo"]);
        let decision = generator.generate("ava", DecisionType::Veto, &on_block, Some(&view), &mut rng);
        assert!(matches!(decision, Decision::Veto { save_nominee: Some(ref s), .. } if s == "ava"));

        let friend = DecisionContext::new().with_nominees(["bo", "cy"]);
        let decision = generator.generate("ava", DecisionType::Veto, &friend, Some(&view), &mut rng);
        assert!(matches!(decision, Decision::Veto { save_nominee: Some(ref s), .. } if s == "cy"));

        let strangers = DecisionContext::new().with_nominees(["bo", "di"]);
        let decision = generator.generate("ava", DecisionType::Veto, &strangers, Some(&view), &mut rng);
        assert!(matches!(decision, Decision::Veto { use_veto: false, .. }));
    }

    #[test]
    fn test_jury_vote_rewards_best_relationship() {
        let mut state = house();
        state.relationships.set("ava", "bo", 10.0);
        state.relationships.set("ava", "cy", 90.0);
        let context = DecisionContext::new().with_finalists(["bo", "cy"]);
        let mut rng = SmallRng::seed_from_u64(1);
        let view = state.view();

        let decision =
            FallbackGenerator::default().generate("ava", DecisionType::JuryVote, &context, Some(&view), &mut rng);
        assert_eq!(decision.reasoning(), Some(FALLBACK_REASONING));
        assert!(matches!(decision, Decision::JuryVote { winner: Some(ref w), .. } if w == "cy"));
    }

    #[test]
    fn test_empty_lists_yield_placeholders() {
        let generator = FallbackGenerator::default();
        let empty = DecisionContext::new();
        let mut rng = SmallRng::seed_from_u64(1);

        for decision_type in DecisionType::all() {
            let decision = generator.generate("ava", *decision_type, &empty, None, &mut rng);
            assert_eq!(decision.decision_type(), Some(*decision_type));
            assert!(decision.ledger_entries("ava").is_empty());
        }
    }

    #[test]
    fn test_uninformed_choices_stay_in_candidates() {
        let generator = FallbackGenerator::default();
        let context = DecisionContext::new()
            .with_eligible(["x", "y", "z"])
            .with_nominees(["x", "y"]);
        let mut rng = SmallRng::seed_from_u64(9);

        for _ in 0..50 {
            match generator.generate("ghost", DecisionType::Replacement, &context, None, &mut rng) {
                Decision::Replacement { nominee, .. } => assert_eq!(nominee.as_deref(), Some("z")),
                other => panic!("unexpected {:?}", other),
            }
        }
    }
}
