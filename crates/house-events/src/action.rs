//! Autonomous Actions
//!
//! Minor social actions an agent takes on its own during the social phase.
//! Actions are transient: generated, executed and discarded each phase.

use serde::{Deserialize, Serialize};

use crate::commitment::PledgeKind;

/// Type of autonomous action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcActionKind {
    /// Casual conversation with one target
    Talk,
    /// Ask a target to form a two-person alliance
    AlliancePropose,
    /// Make a pledge to a target
    Promise,
    /// Gather an existing alliance
    AllianceMeeting,
    /// Pass a rumor about a third party to a listener
    SpreadInfo,
}

impl NpcActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            NpcActionKind::Talk => "talk",
            NpcActionKind::AlliancePropose => "alliance_propose",
            NpcActionKind::Promise => "promise",
            NpcActionKind::AllianceMeeting => "alliance_meeting",
            NpcActionKind::SpreadInfo => "spread_info",
        }
    }
}

impl std::fmt::Display for NpcActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Extra payload some actions need at execution time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionData {
    Pledge { kind: PledgeKind },
    Alliance { alliance_id: String },
}

/// A planned action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcAction {
    pub kind: NpcActionKind,
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub reasoning: String,
    pub priority: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ActionData>,
}

impl NpcAction {
    /// Create a conversation action
    pub fn talk(actor: impl Into<String>, target: impl Into<String>) -> Self {
        Self::targeted(NpcActionKind::Talk, actor, target)
    }

    /// Create an alliance proposal
    pub fn propose_alliance(actor: impl Into<String>, target: impl Into<String>) -> Self {
        Self::targeted(NpcActionKind::AlliancePropose, actor, target)
    }

    /// Create a pledge action
    pub fn promise(actor: impl Into<String>, target: impl Into<String>, kind: PledgeKind) -> Self {
        let mut action = Self::targeted(NpcActionKind::Promise, actor, target);
        action.data = Some(ActionData::Pledge { kind });
        action
    }

    /// Create an alliance meeting action; meetings have no single target
    pub fn alliance_meeting(actor: impl Into<String>, alliance_id: impl Into<String>) -> Self {
        Self {
            kind: NpcActionKind::AllianceMeeting,
            actor: actor.into(),
            target: None,
            reasoning: String::new(),
            priority: 0.0,
            data: Some(ActionData::Alliance {
                alliance_id: alliance_id.into(),
            }),
        }
    }

    /// Create a rumor action aimed at a listener
    pub fn spread_info(actor: impl Into<String>, listener: impl Into<String>) -> Self {
        Self::targeted(NpcActionKind::SpreadInfo, actor, listener)
    }

    fn targeted(kind: NpcActionKind, actor: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind,
            actor: actor.into(),
            target: Some(target.into()),
            reasoning: String::new(),
            priority: 0.0,
            data: None,
        }
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn pledge_kind(&self) -> Option<PledgeKind> {
        match self.data {
            Some(ActionData::Pledge { kind }) => Some(kind),
            _ => None,
        }
    }

    pub fn alliance_id(&self) -> Option<&str> {
        match &self.data {
            Some(ActionData::Alliance { alliance_id }) => Some(alliance_id.as_str()),
            _ => None,
        }
    }
}

/// Outcome of executing an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcActionResult {
    pub action: NpcAction,
    pub success: bool,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_change: Option<f64>,
}

impl NpcActionResult {
    pub fn succeeded(action: NpcAction, description: impl Into<String>) -> Self {
        Self {
            action,
            success: true,
            description: description.into(),
            relationship_change: None,
        }
    }

    pub fn failed(action: NpcAction, description: impl Into<String>) -> Self {
        Self {
            action,
            success: false,
            description: description.into(),
            relationship_change: None,
        }
    }

    pub fn with_relationship_change(mut self, delta: f64) -> Self {
        self.relationship_change = Some(delta);
        self
    }
}
