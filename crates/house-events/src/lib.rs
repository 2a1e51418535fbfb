//! Shared data types for the house social simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod action;
pub mod agent;
pub mod commitment;
pub mod decision;
pub mod interaction;
pub mod phase;

// Re-export agent types
pub use agent::{AbilityStats, Agent, AgentStatus, CompetitionRecord};

// Re-export interaction types
pub use interaction::{Interaction, InteractionDefaults, InteractionKind, Sentiment};

// Re-export commitment types
pub use commitment::{Alliance, Pledge, PledgeKind, PledgeStatus};

// Re-export action types
pub use action::{ActionData, NpcAction, NpcActionKind, NpcActionResult};

// Re-export decision types
pub use decision::{Decision, DecisionContext, DecisionType, LedgerEntry, UnknownDecisionType};

// Re-export phase types
pub use phase::{Phase, Week};
