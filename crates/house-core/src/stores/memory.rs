//! In-memory store implementations.

use std::collections::HashMap;

use house_events::{
    Agent, AgentStatus, Alliance, Phase, Pledge, PledgeKind, PledgeStatus, Week,
};
use uuid::Uuid;

use super::{AllianceStore, PledgeStore, RelationshipStore, Roster, WorldMut, WorldView};
use crate::ledger::Ledger;

/// Agents plus the week's calendar and ceremony state
#[derive(Debug, Clone, Default)]
pub struct HouseRoster {
    agents: Vec<Agent>,
    week: Week,
    phase: Phase,
    head_of_household: Option<String>,
    nominees: Vec<String>,
}

impl HouseRoster {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self {
            agents,
            week: 1,
            ..Default::default()
        }
    }

    pub fn agent_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn set_week(&mut self, week: Week) {
        self.week = week;
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_head_of_household(&mut self, agent_id: Option<String>) {
        self.head_of_household = agent_id;
    }

    pub fn set_nominees(&mut self, nominees: Vec<String>) {
        self.nominees = nominees;
    }

    /// Removes an agent from play; jurors keep voting at the finale
    pub fn evict(&mut self, id: &str, to_jury: bool) {
        if let Some(agent) = self.agent_mut(id) {
            agent.status = if to_jury {
                AgentStatus::Juror
            } else {
                AgentStatus::Evicted
            };
        }
        self.nominees.retain(|n| n != id);
        if self.head_of_household.as_deref() == Some(id) {
            self.head_of_household = None;
        }
    }

    pub fn record_hoh_win(&mut self, id: &str) {
        if let Some(agent) = self.agent_mut(id) {
            agent.record.hoh_wins += 1;
        }
    }

    pub fn record_veto_win(&mut self, id: &str) {
        if let Some(agent) = self.agent_mut(id) {
            agent.record.veto_wins += 1;
        }
    }
}

impl Roster for HouseRoster {
    fn agents(&self) -> &[Agent] {
        &self.agents
    }

    fn week(&self) -> Week {
        self.week
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn head_of_household(&self) -> Option<&str> {
        self.head_of_household.as_deref()
    }

    fn nominees(&self) -> &[String] {
        &self.nominees
    }
}

/// A relationship change recorded through the store
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipEvent {
    pub from: String,
    pub to: String,
    pub tag: String,
    pub description: String,
    pub delta: f64,
    pub is_minor: bool,
}

/// Directed scores keyed by (from, to)
#[derive(Debug, Clone, Default)]
pub struct MemoryRelationships {
    scores: HashMap<(String, String), f64>,
    events: Vec<RelationshipEvent>,
}

impl MemoryRelationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a score without clamping; tests use this to feed extreme values
    pub fn set(&mut self, from: &str, to: &str, score: f64) {
        self.scores.insert((from.to_string(), to.to_string()), score);
    }

    /// Sets the same score in both directions
    pub fn set_mutual(&mut self, a: &str, b: &str, score: f64) {
        self.set(a, b, score);
        self.set(b, a, score);
    }

    pub fn events(&self) -> &[RelationshipEvent] {
        &self.events
    }
}

impl RelationshipStore for MemoryRelationships {
    fn score(&self, from: &str, to: &str) -> Option<f64> {
        self.scores
            .get(&(from.to_string(), to.to_string()))
            .copied()
    }

    fn reciprocity(&self, from: &str, to: &str) -> f64 {
        match (self.score(from, to), self.score(to, from)) {
            (Some(forth), Some(back)) => ((back - forth) / 100.0).clamp(-1.0, 1.0),
            _ => 0.0,
        }
    }

    fn record_event(
        &mut self,
        from: &str,
        to: &str,
        tag: &str,
        description: &str,
        delta: f64,
        is_minor: bool,
    ) {
        let entry = self
            .scores
            .entry((from.to_string(), to.to_string()))
            .or_insert(0.0);
        *entry = (*entry + delta).clamp(-100.0, 100.0);

        self.events.push(RelationshipEvent {
            from: from.to_string(),
            to: to.to_string(),
            tag: tag.to_string(),
            description: description.to_string(),
            delta,
            is_minor,
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryAlliances {
    alliances: Vec<Alliance>,
}

impl MemoryAlliances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a prebuilt alliance, replacing one with the same id
    pub fn insert(&mut self, alliance: Alliance) {
        self.alliances.retain(|a| a.id != alliance.id);
        self.alliances.push(alliance);
    }

    /// Drops an evicted agent from every alliance and removes empty ones
    pub fn remove_member(&mut self, agent_id: &str) {
        for alliance in &mut self.alliances {
            alliance.members.retain(|m| m != agent_id);
        }
        self.alliances.retain(|a| a.member_count() > 1);
    }
}

impl AllianceStore for MemoryAlliances {
    fn all(&self) -> Vec<&Alliance> {
        self.alliances.iter().collect()
    }

    fn create(
        &mut self,
        name: &str,
        members: Vec<String>,
        founder: &str,
        is_public: bool,
        week: Week,
    ) -> Option<Alliance> {
        if members.len() < 2 {
            return None;
        }
        let alliance = Alliance {
            id: format!("al_{}", Uuid::new_v4().simple()),
            name: name.to_string(),
            members,
            founder: founder.to_string(),
            is_public,
            formed_week: week,
            last_meeting_week: None,
        };
        self.alliances.push(alliance.clone());
        Some(alliance)
    }

    fn hold_meeting(&mut self, alliance_id: &str, week: Week) -> bool {
        match self.alliances.iter_mut().find(|a| a.id == alliance_id) {
            Some(alliance) => {
                alliance.last_meeting_week = Some(week);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPledges {
    pledges: Vec<Pledge>,
    next_id: u64,
}

impl MemoryPledges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a prebuilt pledge as-is
    pub fn insert(&mut self, pledge: Pledge) {
        self.pledges.push(pledge);
    }
}

impl PledgeStore for MemoryPledges {
    fn list_all(&self) -> Vec<&Pledge> {
        self.pledges.iter().collect()
    }

    /// New pledges start active: the recipient accepted by being offered
    fn create(
        &mut self,
        from: &str,
        to: &str,
        kind: PledgeKind,
        description: &str,
        week: Week,
    ) -> Pledge {
        self.next_id += 1;
        let pledge = Pledge {
            id: format!("pl_{:06}", self.next_id),
            from_id: from.to_string(),
            to_id: to.to_string(),
            kind,
            status: PledgeStatus::Active,
            description: description.to_string(),
            week,
        };
        self.pledges.push(pledge.clone());
        pledge
    }

    fn set_status(&mut self, pledge_id: &str, status: PledgeStatus) -> bool {
        match self.pledges.iter_mut().find(|p| p.id == pledge_id) {
            Some(pledge) => {
                pledge.status = status;
                true
            }
            None => false,
        }
    }
}

/// Owns one of each in-memory store plus the ledger
#[derive(Debug, Clone, Default)]
pub struct HouseState {
    pub roster: HouseRoster,
    pub relationships: MemoryRelationships,
    pub alliances: MemoryAlliances,
    pub pledges: MemoryPledges,
    pub ledger: Ledger,
}

impl HouseState {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self {
            roster: HouseRoster::new(agents),
            ..Default::default()
        }
    }

    pub fn view(&self) -> WorldView<'_> {
        WorldView::new(
            &self.roster,
            &self.relationships,
            &self.alliances,
            &self.pledges,
        )
        .with_ledger(&self.ledger)
    }

    pub fn view_mut(&mut self) -> WorldMut<'_> {
        WorldMut::new(
            &self.roster,
            &mut self.relationships,
            &mut self.alliances,
            &mut self.pledges,
        )
        .with_ledger(&mut self.ledger)
    }

    /// Moves the roster and ledger to a new week together
    pub fn set_week(&mut self, week: Week) {
        self.roster.set_week(week);
        self.ledger.set_week(week);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_events_clamp_and_log() {
        let mut rels = MemoryRelationships::new();
        rels.set("ava", "bo", 98.0);
        rels.record_event("ava", "bo", "talk", "chatted", 5.0, true);

        assert_eq!(rels.score("ava", "bo"), Some(100.0));
        assert_eq!(rels.events().len(), 1);
        assert!(rels.score("bo", "ava").is_none());
    }

    #[test]
    fn test_reciprocity_is_negative_when_one_sided() {
        let mut rels = MemoryRelationships::new();
        rels.set("ava", "bo", 80.0);
        rels.set("bo", "ava", 0.0);
        assert!((rels.reciprocity("ava", "bo") + 0.8).abs() < 1e-9);
        assert!((rels.reciprocity("bo", "ava") - 0.8).abs() < 1e-9);
        assert_eq!(rels.reciprocity("ava", "cy"), 0.0);
    }

    #[test]
    fn test_alliance_store_queries() {
        let mut alliances = MemoryAlliances::new();
        let created = alliances
            .create("Core", vec!["ava".into(), "bo".into()], "ava", false, 1)
            .unwrap();

        assert!(alliances.are_co_allied("ava", "bo"));
        assert!(!alliances.are_co_allied("ava", "cy"));
        assert!(alliances.hold_meeting(&created.id, 2));
        assert_eq!(alliances.get(&created.id).unwrap().last_meeting_week, Some(2));
        assert!(!alliances.hold_meeting("al_missing", 2));
        assert!(alliances.create("Solo", vec!["ava".into()], "ava", false, 1).is_none());
    }

    #[test]
    fn test_remove_member_dissolves_pairs() {
        let mut alliances = MemoryAlliances::new();
        alliances.create("Core", vec!["ava".into(), "bo".into()], "ava", false, 1);
        alliances.remove_member("bo");
        assert!(alliances.all().is_empty());
    }

    #[test]
    fn test_pledges_start_active() {
        let mut pledges = MemoryPledges::new();
        let pledge = pledges.create("ava", "bo", PledgeKind::Vote, "I'll keep you", 2);
        assert_eq!(pledge.status, PledgeStatus::Active);
        assert_eq!(pledges.made_by("ava").len(), 1);
        assert!(pledges.set_status(&pledge.id, PledgeStatus::Broken));
        assert_eq!(pledges.list_all()[0].status, PledgeStatus::Broken);
    }

    #[test]
    fn test_eviction_clears_ceremony_state() {
        let mut roster = HouseRoster::new(vec![Agent::new("ava", "Ava"), Agent::new("bo", "Bo")]);
        roster.set_head_of_household(Some("ava".to_string()));
        roster.set_nominees(vec!["bo".to_string()]);
        roster.evict("bo", true);

        assert!(roster.nominees().is_empty());
        assert_eq!(roster.agent("bo").unwrap().status, AgentStatus::Juror);
        assert_eq!(roster.active_agents().len(), 1);
    }
}
