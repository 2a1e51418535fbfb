//! Prompt rendering for major decisions.

use std::fmt::Write as _;

use house_core::{threat_level, WorldView};
use house_events::{DecisionContext, DecisionType};

use crate::llm::Prompt;

const SYSTEM: &str = "You are playing a contestant in a social strategy game. \
Stay in character, weigh your relationships and threats, and answer with a \
single JSON object matching the requested shape. Always include a short \
\"reasoning\" string.";

/// JSON shape the model must return for a decision type
pub fn response_shape(decision_type: DecisionType) -> &'static str {
    match decision_type {
        DecisionType::Nomination => {
            r#"{"nominee1": "<id>", "nominee2": "<id>", "reasoning": "<why>"}"#
        }
        DecisionType::Veto => r#"{"useVeto": true|false, "saveNominee": "<id, only when used>", "reasoning": "<why>"}"#,
        DecisionType::Replacement => r#"{"nominee": "<id>", "reasoning": "<why>"}"#,
        DecisionType::EvictionVote => r#"{"voteToEvict": "<id>", "reasoning": "<why>"}"#,
        DecisionType::JuryVote => r#"{"winner": "<id>", "reasoning": "<why>"}"#,
        DecisionType::Dialogue => r#"{"message": "<what you say>", "reasoning": "<why>"}"#,
    }
}

fn candidates(decision_type: DecisionType, context: &DecisionContext) -> &[String] {
    match decision_type {
        DecisionType::Nomination | DecisionType::Replacement => &context.eligible,
        DecisionType::Veto | DecisionType::EvictionVote => &context.nominees,
        DecisionType::JuryVote => &context.finalists,
        DecisionType::Dialogue => &[],
    }
}

pub fn build_prompt(
    agent_id: &str,
    decision_type: DecisionType,
    context: &DecisionContext,
    world: Option<&WorldView<'_>>,
) -> Prompt {
    let mut user = String::new();

    let agent = world.and_then(|w| w.roster.agent(agent_id));
    match agent {
        Some(agent) => {
            let _ = writeln!(user, "You are {} ({}).", agent.name, agent.id);
            if !agent.traits.is_empty() {
                let _ = writeln!(user, "Personality: {}.", agent.traits.join(", "));
            }
        }
        None => {
            let _ = writeln!(user, "You are {}.", agent_id);
        }
    }
    if let Some(world) = world {
        let _ = writeln!(user, "It is week {}, {} phase.", world.week(), world.roster.phase().label());
    }

    let _ = writeln!(user, "\nDecision: {}", decision_type);
    if !context.nominees.is_empty() {
        let _ = writeln!(user, "On the block: {}", context.nominees.join(", "));
    }

    let options = candidates(decision_type, context);
    if !options.is_empty() {
        let _ = writeln!(user, "\nCandidates:");
        for candidate in options {
            match world {
                Some(world) => {
                    let _ = writeln!(
                        user,
                        "- {}: relationship {:.0}, trust {:.0}, threat {:.0}",
                        candidate,
                        world.relationship(agent_id, candidate),
                        world.trust(agent_id, candidate),
                        threat_level(agent_id, candidate, world),
                    );
                }
                None => {
                    let _ = writeln!(user, "- {}", candidate);
                }
            }
        }
    }

    if let Some(situation) = &context.situation {
        let _ = writeln!(user, "\nSituation: {}", situation);
    }

    let _ = writeln!(user, "\nRespond with JSON only:\n{}", response_shape(decision_type));

    Prompt {
        system: SYSTEM.to_string(),
        user,
    }
}
