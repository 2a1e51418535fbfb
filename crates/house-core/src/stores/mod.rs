//! External Stores
//!
//! The engine reads and writes simulation state only through these
//! interfaces. The surrounding application owns the real stores; the
//! [`memory`] module provides in-memory versions for tests and the CLI.

pub mod memory;

use house_events::{
    Agent, Alliance, Interaction, InteractionKind, Phase, Pledge, PledgeKind, PledgeStatus, Week,
};

use crate::ledger::Ledger;

pub use memory::{
    HouseRoster, HouseState, MemoryAlliances, MemoryPledges, MemoryRelationships,
    RelationshipEvent,
};

/// Agent and calendar accessor
pub trait Roster {
    /// Every agent, active or not, in roster order
    fn agents(&self) -> &[Agent];

    fn week(&self) -> Week;

    fn phase(&self) -> Phase;

    /// Current head of household, if one has been crowned this week
    fn head_of_household(&self) -> Option<&str>;

    /// Agents currently on the block
    fn nominees(&self) -> &[String];

    fn active_agents(&self) -> Vec<&Agent> {
        self.agents().iter().filter(|a| a.is_active()).collect()
    }

    fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents().iter().find(|a| a.id == id)
    }

    fn is_nominated(&self, id: &str) -> bool {
        self.nominees().iter().any(|n| n == id)
    }
}

/// Directed relationship scores, nominally within [-100, 100]
pub trait RelationshipStore {
    /// Raw score from `from` toward `to`; `None` when the pair has no history
    fn score(&self, from: &str, to: &str) -> Option<f64>;

    /// Score after any store-side modifiers
    fn effective_score(&self, from: &str, to: &str) -> f64 {
        self.score(from, to).unwrap_or(0.0)
    }

    /// How mutual the relationship is, in [-1, 1]; negative when `to`
    /// thinks less of `from` than `from` thinks of `to`
    fn reciprocity(&self, from: &str, to: &str) -> f64;

    fn record_event(
        &mut self,
        from: &str,
        to: &str,
        tag: &str,
        description: &str,
        delta: f64,
        is_minor: bool,
    );
}

pub trait AllianceStore {
    fn all(&self) -> Vec<&Alliance>;

    fn get(&self, alliance_id: &str) -> Option<&Alliance> {
        self.all().into_iter().find(|a| a.id == alliance_id)
    }

    fn list_for_agent(&self, agent_id: &str) -> Vec<&Alliance> {
        self.all().into_iter().filter(|a| a.contains(agent_id)).collect()
    }

    fn are_co_allied(&self, a: &str, b: &str) -> bool {
        self.list_for_agent(a).iter().any(|al| al.contains(b))
    }

    /// Creates an alliance; `None` when the store refuses it
    fn create(
        &mut self,
        name: &str,
        members: Vec<String>,
        founder: &str,
        is_public: bool,
        week: Week,
    ) -> Option<Alliance>;

    /// Marks a meeting; false when the alliance is unknown
    fn hold_meeting(&mut self, alliance_id: &str, week: Week) -> bool;
}

pub trait PledgeStore {
    fn list_all(&self) -> Vec<&Pledge>;

    fn create(
        &mut self,
        from: &str,
        to: &str,
        kind: PledgeKind,
        description: &str,
        week: Week,
    ) -> Pledge;

    /// Updates a pledge's status; false when the pledge is unknown
    fn set_status(&mut self, pledge_id: &str, status: PledgeStatus) -> bool;

    fn made_by(&self, agent_id: &str) -> Vec<&Pledge> {
        self.list_all()
            .into_iter()
            .filter(|p| p.from_id == agent_id)
            .collect()
    }
}

/// Read-only bundle of everything scoring and planning consult
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    pub roster: &'a dyn Roster,
    pub relationships: &'a dyn RelationshipStore,
    pub alliances: &'a dyn AllianceStore,
    pub pledges: &'a dyn PledgeStore,
    pub ledger: Option<&'a Ledger>,
}

impl<'a> WorldView<'a> {
    pub fn new(
        roster: &'a dyn Roster,
        relationships: &'a dyn RelationshipStore,
        alliances: &'a dyn AllianceStore,
        pledges: &'a dyn PledgeStore,
    ) -> Self {
        Self {
            roster,
            relationships,
            alliances,
            pledges,
            ledger: None,
        }
    }

    pub fn with_ledger(mut self, ledger: &'a Ledger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn week(&self) -> Week {
        self.roster.week()
    }

    /// Relationship from `from` toward `to`, clamped to [-100, 100]
    pub fn relationship(&self, from: &str, to: &str) -> f64 {
        self.relationships
            .effective_score(from, to)
            .clamp(-100.0, 100.0)
    }

    /// Ledger trust of `observer` in `subject`; neutral 50 without a ledger
    pub fn trust(&self, observer: &str, subject: &str) -> f64 {
        self.ledger
            .map_or(50.0, |ledger| ledger.trust_score(observer, subject))
    }
}

/// Mutable bundle handed to action execution
pub struct WorldMut<'a> {
    pub roster: &'a dyn Roster,
    pub relationships: &'a mut dyn RelationshipStore,
    pub alliances: &'a mut dyn AllianceStore,
    pub pledges: &'a mut dyn PledgeStore,
    pub ledger: Option<&'a mut Ledger>,
}

impl<'a> WorldMut<'a> {
    pub fn new(
        roster: &'a dyn Roster,
        relationships: &'a mut dyn RelationshipStore,
        alliances: &'a mut dyn AllianceStore,
        pledges: &'a mut dyn PledgeStore,
    ) -> Self {
        Self {
            roster,
            relationships,
            alliances,
            pledges,
            ledger: None,
        }
    }

    pub fn with_ledger(mut self, ledger: &'a mut Ledger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Appends to the ledger when one is attached
    pub fn record_interaction(
        &mut self,
        from: &str,
        to: &str,
        kind: InteractionKind,
        description: impl Into<String>,
    ) -> Option<Interaction> {
        self.ledger
            .as_deref_mut()
            .map(|ledger| ledger.record_interaction(from, to, kind, description, None))
    }

    /// Borrow a read-only view for scoring mid-execution
    pub fn view(&self) -> WorldView<'_> {
        WorldView {
            roster: self.roster,
            relationships: &*self.relationships,
            alliances: &*self.alliances,
            pledges: &*self.pledges,
            ledger: self.ledger.as_deref(),
        }
    }
}
