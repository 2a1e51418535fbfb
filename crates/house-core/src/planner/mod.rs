//! Social Behavior Planner
//!
//! Each social phase, every non-player agent builds a batch of candidate
//! actions, sorts it once by priority, and executes the top few.

pub mod execute;
pub mod generate;
pub mod preference;

use std::time::Duration;

use house_events::{Agent, NpcAction, NpcActionKind, NpcActionResult};
use rand::Rng;

use crate::config::PlannerConfig;
use crate::stores::{WorldMut, WorldView};

pub use generate::{alliance_desire, shared_threat_count};
pub use preference::{preference_bonus, preferred_actions, trait_preferences};

/// Base priority per action kind
pub fn base_priority(kind: NpcActionKind) -> f64 {
    match kind {
        NpcActionKind::AlliancePropose => 80.0,
        NpcActionKind::Promise => 75.0,
        NpcActionKind::AllianceMeeting => 50.0,
        NpcActionKind::SpreadInfo => 30.0,
        NpcActionKind::Talk => 20.0,
    }
}

#[derive(Debug, Clone, Default)]
pub struct SocialPlanner {
    config: PlannerConfig,
}

impl SocialPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Candidate actions for one agent, highest priority first.
    ///
    /// Players and inactive agents get an empty plan.
    pub fn plan<R: Rng + ?Sized>(&self, agent: &Agent, world: &WorldView<'_>, rng: &mut R) -> Vec<NpcAction> {
        if agent.is_player || !agent.is_active() {
            return Vec::new();
        }

        let mut actions = generate::alliance_proposals(agent, world, &self.config);
        actions.extend(generate::pledge_offers(agent, world, &self.config));
        actions.extend(generate::alliance_meetings(agent, world));
        actions.extend(generate::spread_info(agent, world));
        actions.extend(generate::conversation(agent, world, rng));

        let mut actions: Vec<NpcAction> = actions
            .into_iter()
            .map(|action| {
                let priority = base_priority(action.kind) + preference_bonus(agent, action.kind);
                action.with_priority(priority)
            })
            .collect();
        actions.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        actions
    }

    pub fn execute<R: Rng + ?Sized>(
        &self,
        action: NpcAction,
        world: &mut WorldMut<'_>,
        rng: &mut R,
    ) -> NpcActionResult {
        execute::execute(action, world, &self.config, rng)
    }

    /// One sweep over the active non-player agents in roster order.
    ///
    /// Each agent executes at most `max_actions_per_agent` of its plan.
    /// `on_activity` sees every result as it happens. Consecutive
    /// executions are spaced by `action_delay_ms` on the tokio clock.
    pub async fn run_social_phase<R: Rng + ?Sized>(
        &self,
        world: &mut WorldMut<'_>,
        rng: &mut R,
        mut on_activity: Option<&mut dyn FnMut(&NpcActionResult)>,
    ) -> Vec<NpcActionResult> {
        let actors: Vec<Agent> = world
            .roster
            .active_agents()
            .into_iter()
            .filter(|a| !a.is_player)
            .cloned()
            .collect();
        let delay = Duration::from_millis(self.config.action_delay_ms);

        let mut results = Vec::new();
        for actor in &actors {
            let plan = self.plan(actor, &world.view(), rng);
            for action in plan.into_iter().take(self.config.max_actions_per_agent) {
                if !results.is_empty() && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let result = self.execute(action, world, rng);
                if let Some(callback) = on_activity.as_mut() {
                    callback(&result);
                }
                results.push(result);
            }
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        tracing::info!(
            "Social phase week {}: {} actions, {} succeeded",
            world.roster.week(),
            results.len(),
            succeeded
        );
        results
    }
}
