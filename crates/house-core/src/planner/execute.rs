//! Action Execution
//!
//! Applies a planned action through the stores. Every store mutation is
//! paired with a ledger entry.

use house_events::{InteractionKind, NpcAction, NpcActionKind, NpcActionResult, PledgeKind};
use rand::prelude::*;

use super::generate::{alliance_desire, desire_constants::ACCEPT_THRESHOLD};
use crate::config::PlannerConfig;
use crate::stores::{Roster, WorldMut};

/// Relationship boost range for a conversation
pub const TALK_BOOST: std::ops::RangeInclusive<u32> = 3..=5;

pub fn execute<R: Rng + ?Sized>(
    action: NpcAction,
    world: &mut WorldMut<'_>,
    config: &PlannerConfig,
    rng: &mut R,
) -> NpcActionResult {
    let result = match action.kind {
        NpcActionKind::Talk => execute_talk(action, world, rng),
        NpcActionKind::AlliancePropose => execute_alliance_propose(action, world, config),
        NpcActionKind::Promise => execute_promise(action, world),
        NpcActionKind::AllianceMeeting => execute_alliance_meeting(action, world),
        NpcActionKind::SpreadInfo => execute_spread_info(action, world, rng),
    };

    if result.success {
        tracing::debug!("{} {}: {}", result.action.actor, result.action.kind, result.description);
    } else {
        tracing::debug!(
            "{} {} failed: {}",
            result.action.actor,
            result.action.kind,
            result.description
        );
    }
    result
}

fn name_of(roster: &dyn Roster, id: &str) -> String {
    roster
        .agent(id)
        .map_or_else(|| id.to_string(), |a| a.name.clone())
}

/// Target of a targeted action, if it is still in play
fn active_target(action: &NpcAction, roster: &dyn Roster) -> Option<String> {
    action
        .target
        .as_deref()
        .filter(|t| roster.agent(t).is_some_and(|a| a.is_active()))
        .map(str::to_string)
}

fn execute_talk<R: Rng + ?Sized>(action: NpcAction, world: &mut WorldMut<'_>, rng: &mut R) -> NpcActionResult {
    let Some(target) = active_target(&action, world.roster) else {
        return NpcActionResult::failed(action, "Nobody to talk to");
    };
    let actor = action.actor.clone();
    let boost = rng.gen_range(TALK_BOOST) as f64;
    let description = format!(
        "{} and {} chatted",
        name_of(world.roster, &actor),
        name_of(world.roster, &target)
    );

    world
        .relationships
        .record_event(&actor, &target, "conversation", &description, boost, true);
    world
        .relationships
        .record_event(&target, &actor, "conversation", &description, boost, true);
    world.record_interaction(&actor, &target, InteractionKind::Conversation, description.clone());
    world.record_interaction(&target, &actor, InteractionKind::Conversation, description.clone());

    NpcActionResult::succeeded(action, description).with_relationship_change(boost)
}

fn execute_alliance_propose(
    action: NpcAction,
    world: &mut WorldMut<'_>,
    config: &PlannerConfig,
) -> NpcActionResult {
    let Some(target) = active_target(&action, world.roster) else {
        return NpcActionResult::failed(action, "Proposal target is gone");
    };
    let actor = action.actor.clone();
    let actor_name = name_of(world.roster, &actor);
    let target_name = name_of(world.roster, &target);

    let (already_allied, actor_full, target_full, reciprocal) = {
        let view = world.view();
        let full = |id: &str| view.alliances.list_for_agent(id).len() >= config.max_alliances;
        (
            view.alliances.are_co_allied(&actor, &target),
            full(&actor),
            full(&target),
            alliance_desire(&target, &actor, &view),
        )
    };
    if already_allied || actor_full {
        return NpcActionResult::failed(action, format!("{} cannot take on another alliance", actor_name));
    }
    if target_full || reciprocal <= ACCEPT_THRESHOLD {
        return NpcActionResult::failed(
            action,
            format!("{} turned down {}'s alliance offer", target_name, actor_name),
        );
    }

    let week = world.roster.week();
    let name = format!("{} & {}", actor_name, target_name);
    let members = vec![actor.clone(), target.clone()];
    let Some(alliance) = world.alliances.create(&name, members, &actor, false, week) else {
        return NpcActionResult::failed(action, "The alliance store refused the new alliance");
    };

    let description = format!("{} and {} formed {}", actor_name, target_name, alliance.name);
    world.record_interaction(&actor, &target, InteractionKind::AllianceFormed, description.clone());
    world.record_interaction(&target, &actor, InteractionKind::AllianceFormed, description.clone());
    NpcActionResult::succeeded(action, description)
}

fn execute_promise(action: NpcAction, world: &mut WorldMut<'_>) -> NpcActionResult {
    let (Some(target), Some(kind)) = (active_target(&action, world.roster), action.pledge_kind()) else {
        return NpcActionResult::failed(action, "Promise has no recipient");
    };
    let actor = action.actor.clone();
    let target_name = name_of(world.roster, &target);
    let description = match kind {
        PledgeKind::Safety => format!("promised {} they are safe", target_name),
        PledgeKind::Vote => format!("promised {} their vote", target_name),
        PledgeKind::AllianceLoyalty => format!("promised {} loyalty", target_name),
        PledgeKind::FinalTwo => format!("promised {} a final two seat", target_name),
        PledgeKind::Information => format!("promised to keep {} informed", target_name),
    };
    let description = format!("{} {}", name_of(world.roster, &actor), description);

    let week = world.roster.week();
    world.pledges.create(&actor, &target, kind, &description, week);
    world.record_interaction(&actor, &target, InteractionKind::PromiseMade, description.clone());
    NpcActionResult::succeeded(action, description)
}

fn execute_alliance_meeting(action: NpcAction, world: &mut WorldMut<'_>) -> NpcActionResult {
    let actor = action.actor.clone();
    let Some(alliance) = action
        .alliance_id()
        .and_then(|id| world.alliances.get(id))
        .filter(|a| a.contains(&actor))
        .cloned()
    else {
        return NpcActionResult::failed(action, "No such alliance to meet with");
    };

    let week = world.roster.week();
    if !world.alliances.hold_meeting(&alliance.id, week) {
        return NpcActionResult::failed(action, "The alliance store refused the meeting");
    }

    let description = format!("{} called a meeting of {}", name_of(world.roster, &actor), alliance.name);
    for member in alliance.members.iter().filter(|m| **m != actor) {
        world.record_interaction(&actor, member, InteractionKind::AllianceMeeting, description.clone());
    }
    NpcActionResult::succeeded(action, description)
}

fn execute_spread_info<R: Rng + ?Sized>(
    action: NpcAction,
    world: &mut WorldMut<'_>,
    rng: &mut R,
) -> NpcActionResult {
    let Some(listener) = active_target(&action, world.roster) else {
        return NpcActionResult::failed(action, "Nobody to whisper to");
    };
    let actor = action.actor.clone();
    let subjects: Vec<String> = world
        .roster
        .active_agents()
        .into_iter()
        .filter(|a| a.id != actor && a.id != listener)
        .map(|a| a.id.clone())
        .collect();
    let Some(subject) = subjects.choose(rng).cloned() else {
        return NpcActionResult::failed(action, "Nobody left to gossip about");
    };

    let description = format!(
        "{} told {} a story about {}",
        name_of(world.roster, &actor),
        name_of(world.roster, &listener),
        name_of(world.roster, &subject)
    );
    world.record_interaction(&actor, &subject, InteractionKind::RumorSpread, description.clone());
    NpcActionResult::succeeded(action, description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{AllianceStore, HouseState, PledgeStore, RelationshipStore};
    use house_events::{Agent, PledgeStatus};
    use rand::rngs::SmallRng;

    fn house() -> HouseState {
        HouseState::new(vec![
            Agent::new("ava", "Ava"),
            Agent::new("bo", "Bo"),
            Agent::new("cy", "Cy"),
        ])
    }

    fn run(state: &mut HouseState, action: NpcAction) -> NpcActionResult {
        let mut rng = SmallRng::seed_from_u64(3);
        execute(action, &mut state.view_mut(), &PlannerConfig::default(), &mut rng)
    }

    #[test]
    fn test_talk_is_mutual_and_logged_both_ways() {
        let mut state = house();
        let result = run(&mut state, NpcAction::talk("ava", "bo"));

        assert!(result.success);
        let boost = result.relationship_change.unwrap();
        assert!((3.0..=5.0).contains(&boost));
        assert_eq!(state.relationships.score("ava", "bo"), Some(boost));
        assert_eq!(state.relationships.score("bo", "ava"), Some(boost));
        assert_eq!(state.ledger.len(), 2);
        assert!(state
            .ledger
            .interactions()
            .iter()
            .all(|i| i.kind == InteractionKind::Conversation));
    }

    #[test]
    fn test_rejected_proposal_changes_nothing() {
        let mut state = house();
        state.relationships.set("ava", "bo", 80.0);
        state.relationships.set("bo", "ava", -50.0);

        let result = run(&mut state, NpcAction::propose_alliance("ava", "bo"));
        assert!(!result.success);
        assert!(state.alliances.all().is_empty());
        assert!(state.ledger.is_empty());
    }

    #[test]
    fn test_accepted_proposal_forms_alliance() {
        let mut state = house();
        state.relationships.set_mutual("ava", "bo", 60.0);

        let result = run(&mut state, NpcAction::propose_alliance("ava", "bo"));
        assert!(result.success, "{}", result.description);
        assert!(state.alliances.are_co_allied("ava", "bo"));
        assert_eq!(state.ledger.summarize("bo", "ava").positive_count, 1);
        assert_eq!(state.ledger.summarize("ava", "bo").positive_count, 1);
    }

    #[test]
    fn test_promise_creates_active_pledge() {
        let mut state = house();
        let result = run(&mut state, NpcAction::promise("ava", "bo", PledgeKind::Vote));

        assert!(result.success);
        let pledges = state.pledges.made_by("ava");
        assert_eq!(pledges.len(), 1);
        assert_eq!(pledges[0].status, PledgeStatus::Active);
        assert_eq!(state.ledger.interactions()[0].kind, InteractionKind::PromiseMade);
    }

    #[test]
    fn test_meeting_logs_each_other_member() {
        let mut state = house();
        let alliance = state
            .alliances
            .create("Trio", vec!["ava".into(), "bo".into(), "cy".into()], "ava", false, 1)
            .unwrap();

        let result = run(&mut state, NpcAction::alliance_meeting("ava", &alliance.id));
        assert!(result.success);
        assert_eq!(state.alliances.get(&alliance.id).unwrap().last_meeting_week, Some(1));
        assert_eq!(state.ledger.len(), 2);

        let outsider = run(&mut state, NpcAction::alliance_meeting("ava", "al_missing"));
        assert!(!outsider.success);
    }

    #[test]
    fn test_rumor_targets_a_third_party_only() {
        let mut state = house();
        let result = run(&mut state, NpcAction::spread_info("ava", "bo"));

        assert!(result.success);
        let rumor = &state.ledger.interactions()[0];
        assert_eq!(rumor.kind, InteractionKind::RumorSpread);
        assert_eq!(rumor.from_id, "ava");
        assert_eq!(rumor.to_id, "cy");
        assert!(state.relationships.events().is_empty());
    }

    #[test]
    fn test_evicted_target_fails() {
        let mut state = house();
        state.roster.evict("bo", false);
        let result = run(&mut state, NpcAction::talk("ava", "bo"));
        assert!(!result.success);
        assert!(state.ledger.is_empty());
    }
}
