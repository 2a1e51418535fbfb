//! Season Driver
//!
//! Runs one game week at a time: social phase, Head of Household
//! competition, nominations, veto, eviction. Major decisions go through
//! the orchestrator; their effects are written to the stores and the
//! ledger here.

use house_core::{HouseState, RelationshipStore, Roster, SocialPlanner};
use house_events::{AgentStatus, Decision, DecisionContext, DecisionType, NpcActionResult, Phase, Week};
use house_oracle::{FailureNotice, Orchestrator};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::SmallRng;

/// Evictees join the jury once this few agents remain
pub const JURY_THRESHOLD: usize = 5;
/// Extra random players drawn into the veto competition
const VETO_DRAW: usize = 3;
/// Share of an interaction's impact applied to the target's relationship
const RELATIONSHIP_SHARE: f64 = 0.5;
/// Stat floor so weak competitors can still win
const MIN_COMPETITION_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekReport {
    pub week: Week,
    pub social_actions: usize,
    pub head_of_household: Option<String>,
    pub nominees: Vec<String>,
    pub veto_holder: Option<String>,
    pub veto_used: bool,
    pub evicted: Option<String>,
    pub notices: Vec<FailureNotice>,
}

pub struct Season {
    state: HouseState,
    planner: SocialPlanner,
    oracle: Orchestrator,
    rng: SmallRng,
}

impl Season {
    pub fn new(state: HouseState, planner: SocialPlanner, oracle: Orchestrator, seed: u64) -> Self {
        Self {
            state,
            planner,
            oracle,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> &HouseState {
        &self.state
    }

    pub fn remaining(&self) -> usize {
        self.state.roster.active_agents().len()
    }

    pub fn is_over(&self) -> bool {
        self.remaining() <= 2
    }

    fn active_ids(&self) -> Vec<String> {
        self.state
            .roster
            .active_agents()
            .into_iter()
            .map(|a| a.id.clone())
            .collect()
    }

    fn name_of(&self, id: &str) -> String {
        self.state
            .roster
            .agent(id)
            .map_or_else(|| id.to_string(), |a| a.name.clone())
    }

    async fn decide(&mut self, agent_id: &str, decision_type: DecisionType, context: &DecisionContext) -> Decision {
        let view = self.state.view();
        self.oracle
            .request_major_decision(agent_id, decision_type, context, Some(&view))
            .await
    }

    /// Records what an applied decision did to its targets
    fn apply(&mut self, actor: &str, decision: &Decision) {
        for entry in decision.ledger_entries(actor) {
            let delta = entry.kind.defaults().impact * RELATIONSHIP_SHARE;
            self.state.relationships.record_event(
                &entry.to_id,
                actor,
                entry.kind.label(),
                &entry.description,
                delta,
                false,
            );
            self.state
                .ledger
                .record_interaction(actor, &entry.to_id, entry.kind, entry.description, None);
        }
    }

    /// Picks a winner weighted by competition stat
    fn competition(&mut self, entrants: &[String]) -> Option<String> {
        let weights: Vec<f64> = entrants
            .iter()
            .map(|id| {
                self.state
                    .roster
                    .agent(id)
                    .map_or(MIN_COMPETITION_WEIGHT, |a| a.stats.competition.max(MIN_COMPETITION_WEIGHT))
            })
            .collect();
        let dist = WeightedIndex::new(&weights).ok()?;
        entrants.get(dist.sample(&mut self.rng)).cloned()
    }

    pub async fn play_week(&mut self) -> WeekReport {
        let week = self.state.roster.week();
        let mut report = WeekReport {
            week,
            ..Default::default()
        };

        self.state.roster.set_phase(Phase::Social);
        let mut narrate = |result: &NpcActionResult| {
            if result.success {
                println!("  {}", result.description);
            }
        };
        let results = self
            .planner
            .run_social_phase(
                &mut self.state.view_mut(),
                &mut self.rng,
                Some(&mut narrate as &mut dyn FnMut(&NpcActionResult)),
            )
            .await;
        report.social_actions = results.len();

        self.state.roster.set_phase(Phase::HeadOfHousehold);
        let active = self.active_ids();
        let outgoing = self.state.roster.head_of_household().map(str::to_string);
        let entrants: Vec<String> = active
            .iter()
            .filter(|id| active.len() <= 3 || outgoing.as_deref() != Some(id.as_str()))
            .cloned()
            .collect();
        let Some(hoh) = self.competition(&entrants) else {
            tracing::error!("Nobody could compete for Head of Household in week {}", week);
            return report;
        };
        self.state.roster.record_hoh_win(&hoh);
        self.state.roster.set_head_of_household(Some(hoh.clone()));
        self.state.roster.set_nominees(Vec::new());
        println!("  {} wins Head of Household", self.name_of(&hoh));
        report.head_of_household = Some(hoh.clone());

        self.state.roster.set_phase(Phase::Nomination);
        let eligible: Vec<String> = active.iter().filter(|id| **id != hoh).cloned().collect();
        let context = DecisionContext::new().with_eligible(eligible.clone());
        let decision = self.decide(&hoh, DecisionType::Nomination, &context).await;
        self.apply(&hoh, &decision);
        let mut nominees = match decision {
            Decision::Nomination { nominees, .. } => nominees,
            _ => Vec::new(),
        };
        if nominees.is_empty() {
            tracing::warn!("No nominations in week {}, skipping eviction", week);
            self.finish_week(&mut report);
            return report;
        }
        self.state.roster.set_nominees(nominees.clone());
        println!(
            "  {} nominates {}",
            self.name_of(&hoh),
            nominees.iter().map(|n| self.name_of(n)).collect::<Vec<_>>().join(" and ")
        );

        self.state.roster.set_phase(Phase::Veto);
        let mut players: Vec<String> = std::iter::once(hoh.clone()).chain(nominees.iter().cloned()).collect();
        let others: Vec<String> = active.iter().filter(|id| !players.contains(id)).cloned().collect();
        players.extend(others.choose_multiple(&mut self.rng, VETO_DRAW).cloned());
        if let Some(holder) = self.competition(&players) {
            self.state.roster.record_veto_win(&holder);
            println!("  {} wins the veto", self.name_of(&holder));
            report.veto_holder = Some(holder.clone());

            self.state.roster.set_phase(Phase::VetoCeremony);
            let context = DecisionContext::new().with_nominees(nominees.clone());
            let decision = self.decide(&holder, DecisionType::Veto, &context).await;
            if let Decision::Veto {
                use_veto: true,
                save_nominee: Some(saved),
                ..
            } = &decision
            {
                if nominees.contains(saved) {
                    self.apply(&holder, &decision);
                    nominees.retain(|n| n != saved);
                    report.veto_used = true;
                    println!("  {} uses the veto on {}", self.name_of(&holder), self.name_of(saved));

                    let replacements: Vec<String> = eligible
                        .iter()
                        .filter(|id| **id != holder && *id != saved && !nominees.contains(id))
                        .cloned()
                        .collect();
                    let context = DecisionContext::new()
                        .with_eligible(replacements)
                        .with_nominees(nominees.clone());
                    let decision = self.decide(&hoh, DecisionType::Replacement, &context).await;
                    self.apply(&hoh, &decision);
                    if let Decision::Replacement { nominee: Some(replacement), .. } = decision {
                        println!("  {} names {} as the replacement", self.name_of(&hoh), self.name_of(&replacement));
                        nominees.push(replacement);
                    }
                    self.state.roster.set_nominees(nominees.clone());
                }
            }
        }
        report.nominees = nominees.clone();

        self.state.roster.set_phase(Phase::Eviction);
        let evicted = self.eviction_vote(&hoh, &nominees).await;
        if let Some(evicted) = &evicted {
            let to_jury = self.remaining() - 1 <= JURY_THRESHOLD;
            self.state.roster.evict(evicted, to_jury);
            self.state.alliances.remove_member(evicted);
            println!(
                "  {} is evicted{}",
                self.name_of(evicted),
                if to_jury { " and joins the jury" } else { "" }
            );
        }
        report.evicted = evicted;

        self.finish_week(&mut report);
        report
    }

    async fn eviction_vote(&mut self, hoh: &str, nominees: &[String]) -> Option<String> {
        let voters: Vec<String> = self
            .active_ids()
            .into_iter()
            .filter(|id| id != hoh && !nominees.contains(id))
            .collect();
        let context = DecisionContext::new().with_nominees(nominees.to_vec());

        let mut tally: Vec<(String, u32)> = nominees.iter().map(|n| (n.clone(), 0)).collect();
        for voter in &voters {
            let decision = self.decide(voter, DecisionType::EvictionVote, &context).await;
            self.apply(voter, &decision);
            if let Decision::EvictionVote {
                vote_to_evict: Some(target),
                ..
            } = decision
            {
                if let Some(entry) = tally.iter_mut().find(|(n, _)| *n == target) {
                    entry.1 += 1;
                }
            }
        }

        let top = tally.iter().map(|(_, votes)| *votes).max()?;
        let leaders: Vec<String> = tally
            .into_iter()
            .filter(|(_, votes)| *votes == top)
            .map(|(n, _)| n)
            .collect();
        if leaders.len() == 1 {
            return leaders.into_iter().next();
        }

        // tie or no eligible voters: the Head of Household decides
        let context = DecisionContext::new().with_nominees(leaders.clone());
        let decision = self.decide(hoh, DecisionType::EvictionVote, &context).await;
        self.apply(hoh, &decision);
        match decision {
            Decision::EvictionVote {
                vote_to_evict: Some(target),
                ..
            } => Some(target),
            _ => leaders.into_iter().next(),
        }
    }

    fn finish_week(&mut self, report: &mut WeekReport) {
        report.notices = self.oracle.take_notices();
        for notice in &report.notices {
            println!(
                "  [notice] LLM service failed {} times in a row ({})",
                notice.consecutive_failures, notice.last_error
            );
        }
        self.state.set_week(report.week + 1);
    }

    /// Jurors pick a winner between the last two agents
    pub async fn finale(&mut self) -> Option<String> {
        self.state.roster.set_phase(Phase::Jury);
        let finalists = self.active_ids();
        let jurors: Vec<String> = self
            .state
            .roster
            .agents()
            .iter()
            .filter(|a| a.status == AgentStatus::Juror)
            .map(|a| a.id.clone())
            .collect();
        let context = DecisionContext::new().with_finalists(finalists.clone());

        let mut tally: Vec<(String, u32)> = finalists.iter().map(|f| (f.clone(), 0)).collect();
        for juror in &jurors {
            let decision = self.decide(juror, DecisionType::JuryVote, &context).await;
            if let Decision::JuryVote { winner: Some(winner), .. } = decision {
                println!("  {} votes for {}", self.name_of(juror), self.name_of(&winner));
                if let Some(entry) = tally.iter_mut().find(|(f, _)| *f == winner) {
                    entry.1 += 1;
                }
            }
        }

        let top = tally.iter().map(|(_, votes)| *votes).max()?;
        let leaders: Vec<String> = tally
            .into_iter()
            .filter(|(_, votes)| *votes == top)
            .map(|(f, _)| f)
            .collect();
        leaders.choose(&mut self.rng).cloned()
    }
}
