//! Core decision engine: interaction ledger, threat assessment, decision
//! factors and the social behavior planner.
//!
//! The engine reads and writes simulation state only through the store
//! traits in [`stores`]; the caller owns the concrete stores.

pub mod config;
pub mod factors;
pub mod ledger;
pub mod planner;
pub mod stores;
pub mod threat;

pub use config::{BaseWeights, ConfigError, EngineConfig, LedgerConfig, PlannerConfig};
pub use factors::{score, DecisionFactors, FactorEngine, RankedTarget, TraitWeights};
pub use ledger::{CheckpointError, InteractionSummary, Ledger};
pub use planner::SocialPlanner;
pub use stores::{
    AllianceStore, HouseRoster, HouseState, PledgeStore, RelationshipStore, Roster, WorldMut,
    WorldView,
};
pub use threat::{is_major_threat, threat_breakdown, threat_level, ThreatBreakdown};
