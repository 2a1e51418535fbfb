//! Candidate Generation
//!
//! Builds the batch of candidate actions for one agent. Each generator
//! returns unprioritized actions; [`super::SocialPlanner::plan`] scores and
//! sorts the batch once.

use house_events::{Agent, NpcAction, NpcActionKind, PledgeKind};
use rand::distributions::WeightedIndex;
use rand::prelude::*;

use super::preference::preferred_actions;
use crate::config::PlannerConfig;
use crate::factors::strategic_value;
use crate::stores::WorldView;

/// Desire and sampling constants
pub mod desire_constants {
    pub const RELATIONSHIP_FACTOR: f64 = 0.4;
    pub const SHARED_THREAT_POINTS: f64 = 15.0;
    pub const EXISTING_ALLIANCE_PENALTY: f64 = 10.0;
    pub const STRATEGIC_FACTOR: f64 = 0.15;
    pub const TRUST_FACTOR: f64 = 0.3;
    /// Desire needed before proposing
    pub const PROPOSE_THRESHOLD: f64 = 25.0;
    /// Reciprocal desire needed before accepting
    pub const ACCEPT_THRESHOLD: f64 = 15.0;
    /// Both agents must rate a third below this for it to be a shared threat
    pub const SHARED_THREAT_RELATIONSHIP: f64 = -20.0;
    /// Offset keeping disliked agents in the conversation draw
    pub const TALK_WEIGHT_OFFSET: f64 = 60.0;
    /// Relationship needed for a final-two pledge
    pub const FINAL_TWO_RELATIONSHIP: f64 = 60.0;
    /// Final-two pledges only make sense this late
    pub const FINAL_TWO_MAX_REMAINING: usize = 6;
}

use desire_constants::*;

/// Active agents other than `actor` the planner may act toward
pub(crate) fn other_npcs<'a>(actor: &str, world: &WorldView<'a>) -> Vec<&'a Agent> {
    world
        .roster
        .active_agents()
        .into_iter()
        .filter(|a| a.id != actor && !a.is_player)
        .collect()
}

/// Active agents, other than `actor` and `target`, both rate below -20
pub fn shared_threat_count(actor: &str, target: &str, world: &WorldView<'_>) -> usize {
    world
        .roster
        .active_agents()
        .iter()
        .filter(|a| a.id != actor && a.id != target)
        .filter(|a| {
            world.relationship(actor, &a.id) < SHARED_THREAT_RELATIONSHIP
                && world.relationship(target, &a.id) < SHARED_THREAT_RELATIONSHIP
        })
        .count()
}

/// How much `actor` wants an alliance with `target`
pub fn alliance_desire(actor: &str, target: &str, world: &WorldView<'_>) -> f64 {
    let relationship = world.relationship(actor, target);
    let shared = shared_threat_count(actor, target, world) as f64;
    let alliances = world.alliances.list_for_agent(actor).len() as f64;
    let strategic = strategic_value(world.roster.agent(actor), world.roster.agent(target));
    let trust = world.trust(actor, target);

    RELATIONSHIP_FACTOR * relationship + SHARED_THREAT_POINTS * shared
        - EXISTING_ALLIANCE_PENALTY * alliances
        + STRATEGIC_FACTOR * strategic
        + TRUST_FACTOR * (trust - 50.0)
}

pub fn alliance_proposals(actor: &Agent, world: &WorldView<'_>, config: &PlannerConfig) -> Vec<NpcAction> {
    if world.alliances.list_for_agent(&actor.id).len() >= config.max_alliances {
        return Vec::new();
    }

    other_npcs(&actor.id, world)
        .into_iter()
        .filter(|target| !world.alliances.are_co_allied(&actor.id, &target.id))
        .filter(|target| world.relationship(&actor.id, &target.id) >= config.min_alliance_relationship)
        .filter_map(|target| {
            let desire = alliance_desire(&actor.id, &target.id, world);
            (desire > PROPOSE_THRESHOLD).then(|| {
                NpcAction::propose_alliance(&actor.id, &target.id)
                    .with_reasoning(format!("Wants {} on side (desire {:.0})", target.name, desire))
            })
        })
        .collect()
}

/// One pledge per target: the first rule that applies and is not already pledged
pub fn pledge_offers(actor: &Agent, world: &WorldView<'_>, config: &PlannerConfig) -> Vec<NpcAction> {
    let roster = world.roster;
    let remaining = roster.active_agents().len();
    let actor_nominated = roster.is_nominated(&actor.id);
    let open_pledges: Vec<_> = world
        .pledges
        .made_by(&actor.id)
        .into_iter()
        .filter(|p| p.status.is_open())
        .collect();
    let holds_final_two = open_pledges.iter().any(|p| p.kind == PledgeKind::FinalTwo);
    let already_pledged = |target: &str, kind: PledgeKind| {
        open_pledges.iter().any(|p| p.to_id == target && p.kind == kind)
    };

    let mut offers = Vec::new();
    for target in roster.active_agents() {
        if target.id == actor.id {
            continue;
        }
        let relationship = world.relationship(&actor.id, &target.id);
        let co_allied = world.alliances.are_co_allied(&actor.id, &target.id);

        let rules = [
            (
                actor_nominated && !roster.is_nominated(&target.id),
                PledgeKind::Vote,
                "On the block and needs votes",
            ),
            (
                roster.head_of_household() == Some(target.id.as_str()) && !co_allied,
                PledgeKind::Safety,
                "Buying safety from the head of household",
            ),
            (
                relationship > config.pledge_relationship_threshold && !co_allied,
                PledgeKind::AllianceLoyalty,
                "Close enough to promise loyalty",
            ),
            (
                relationship > FINAL_TWO_RELATIONSHIP
                    && remaining <= FINAL_TWO_MAX_REMAINING
                    && !holds_final_two,
                PledgeKind::FinalTwo,
                "Endgame partner",
            ),
        ];

        let chosen = rules
            .into_iter()
            .find(|(applies, kind, _)| *applies && !already_pledged(&target.id, *kind));
        if let Some((_, kind, reasoning)) = chosen {
            offers.push(NpcAction::promise(&actor.id, &target.id, kind).with_reasoning(reasoning));
        }
    }
    offers
}

pub fn alliance_meetings(actor: &Agent, world: &WorldView<'_>) -> Vec<NpcAction> {
    let week = world.week();
    world
        .alliances
        .list_for_agent(&actor.id)
        .into_iter()
        .filter(|a| a.needs_meeting(week))
        .map(|a| {
            NpcAction::alliance_meeting(&actor.id, &a.id)
                .with_reasoning(format!("{} has not met this week", a.name))
        })
        .collect()
}

/// One conversation partner, weighted by `max(1, relationship + 60)`
pub fn conversation<R: Rng + ?Sized>(actor: &Agent, world: &WorldView<'_>, rng: &mut R) -> Option<NpcAction> {
    let partners = other_npcs(&actor.id, world);
    let weights: Vec<f64> = partners
        .iter()
        .map(|p| (world.relationship(&actor.id, &p.id) + TALK_WEIGHT_OFFSET).max(1.0))
        .collect();
    let dist = WeightedIndex::new(&weights).ok()?;
    let partner = partners[dist.sample(rng)];
    Some(NpcAction::talk(&actor.id, &partner.id).with_reasoning(format!("Catching up with {}", partner.name)))
}

/// Rumor aimed at the listener the agent likes most, for agents inclined to gossip
pub fn spread_info(actor: &Agent, world: &WorldView<'_>) -> Option<NpcAction> {
    if !preferred_actions(actor).contains(&NpcActionKind::SpreadInfo) {
        return None;
    }
    let listeners = other_npcs(&actor.id, world);
    // needs a listener plus somebody to talk about
    if world.roster.active_agents().len() < 3 {
        return None;
    }
    let mut best: Option<(&Agent, f64)> = None;
    for listener in listeners {
        let relationship = world.relationship(&actor.id, &listener.id);
        if best.map_or(true, |(_, top)| relationship > top) {
            best = Some((listener, relationship));
        }
    }
    best.map(|(listener, _)| {
        NpcAction::spread_info(&actor.id, &listener.id)
            .with_reasoning(format!("Planting a story with {}", listener.name))
    })
}
