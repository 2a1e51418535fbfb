//! Decision Orchestrator
//!
//! Routes major decisions to the external model and always returns a
//! usable [`Decision`]. A request moves through
//! `Requested -> RateLimitWait -> Calling -> Parsing -> Validating` and
//! ends either `Accepted` or in `Fallback`, where the heuristic generator
//! takes over.

use std::fmt;

use house_core::{FactorEngine, WorldView};
use house_events::{Decision, DecisionContext, DecisionType};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::time::{timeout, Instant};
use uuid::Uuid;

use crate::config::OracleConfig;
use crate::error::{LlmError, ResponseError};
use crate::fallback::FallbackGenerator;
use crate::llm::{HttpLlmClient, LlmClient};
use crate::parse::extract_json;
use crate::prompt::build_prompt;
use crate::rate_limit::RateLimiter;
use crate::schema::validate;
use crate::tracker::{ErrorTracker, FailureNotice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionStage {
    Requested,
    RateLimitWait,
    Calling,
    Parsing,
    Validating,
    Accepted,
    Fallback,
}

impl fmt::Display for DecisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DecisionStage::Requested => "requested",
            DecisionStage::RateLimitWait => "rate_limit_wait",
            DecisionStage::Calling => "calling",
            DecisionStage::Parsing => "parsing",
            DecisionStage::Validating => "validating",
            DecisionStage::Accepted => "accepted",
            DecisionStage::Fallback => "fallback",
        };
        f.write_str(label)
    }
}

/// Why a request ended in the fallback generator
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// No LLM client is configured
    NoCredential,
    /// External calls are switched off
    FailOpen,
    Transport(String),
    Parse(ResponseError),
    Schema(ResponseError),
}

impl FallbackReason {
    /// Only attempted calls count toward the failure threshold
    pub fn counts_as_failure(&self) -> bool {
        matches!(
            self,
            FallbackReason::Transport(_) | FallbackReason::Parse(_) | FallbackReason::Schema(_)
        )
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoCredential => f.write_str("no credential"),
            FallbackReason::FailOpen => f.write_str("fail-open"),
            FallbackReason::Transport(e) => write!(f, "transport: {}", e),
            FallbackReason::Parse(e) => write!(f, "parse: {}", e),
            FallbackReason::Schema(e) => write!(f, "schema: {}", e),
        }
    }
}

/// A decision plus how it was reached
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    pub decision: Decision,
    pub stage: DecisionStage,
    pub fallback_reason: Option<FallbackReason>,
}

pub struct Orchestrator {
    client: Option<Box<dyn LlmClient>>,
    config: OracleConfig,
    limiter: RateLimiter,
    tracker: ErrorTracker,
    fallback: FallbackGenerator,
    rng: SmallRng,
}

impl Orchestrator {
    pub fn new(
        config: OracleConfig,
        client: Option<Box<dyn LlmClient>>,
        engine: FactorEngine,
        seed: u64,
    ) -> Self {
        Self {
            client,
            limiter: RateLimiter::new(config.min_call_interval()),
            tracker: ErrorTracker::new(config.error_window(), config.error_threshold),
            fallback: FallbackGenerator::new(engine, config.veto_relationship_threshold),
            rng: SmallRng::seed_from_u64(seed),
            config,
        }
    }

    /// Uses the HTTP client when a credential is in the environment,
    /// otherwise runs on fallback decisions only
    pub fn from_env(config: OracleConfig, engine: FactorEngine, seed: u64) -> Self {
        let client: Option<Box<dyn LlmClient>> = match HttpLlmClient::from_env(&config) {
            Ok(client) => {
                tracing::info!("LLM client ready (model {})", client.model());
                Some(Box::new(client))
            }
            Err(LlmError::MissingCredential) => {
                tracing::info!("No LLM credential set, major decisions use local heuristics");
                None
            }
            Err(e) => {
                tracing::warn!("LLM client unavailable: {}", e);
                None
            }
        };
        Self::new(config, client, engine, seed)
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Never fails: any error along the way yields a fallback decision
    pub async fn request_major_decision(
        &mut self,
        agent_id: &str,
        decision_type: DecisionType,
        context: &DecisionContext,
        world: Option<&WorldView<'_>>,
    ) -> Decision {
        self.request_with_outcome(agent_id, decision_type, context, world)
            .await
            .decision
    }

    /// Like [`Self::request_major_decision`] for a decision type given by
    /// name. Unknown names produce [`Decision::Empty`].
    pub async fn request_by_name(
        &mut self,
        agent_id: &str,
        decision_type: &str,
        context: &DecisionContext,
        world: Option<&WorldView<'_>>,
    ) -> Decision {
        match decision_type.parse::<DecisionType>() {
            Ok(decision_type) => {
                self.request_major_decision(agent_id, decision_type, context, world)
                    .await
            }
            Err(e) => {
                tracing::warn!("{} requested by {}", e, agent_id);
                Decision::Empty
            }
        }
    }

    pub async fn request_with_outcome(
        &mut self,
        agent_id: &str,
        decision_type: DecisionType,
        context: &DecisionContext,
        world: Option<&WorldView<'_>>,
    ) -> DecisionOutcome {
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, "{} {} for {}", DecisionStage::Requested, decision_type, agent_id);

        match self
            .attempt(request_id, agent_id, decision_type, context, world)
            .await
        {
            Ok(decision) => {
                self.tracker.record_success();
                tracing::debug!(%request_id, "{} {} for {}", DecisionStage::Accepted, decision_type, agent_id);
                DecisionOutcome {
                    decision,
                    stage: DecisionStage::Accepted,
                    fallback_reason: None,
                }
            }
            Err(reason) => {
                if reason.counts_as_failure() {
                    self.tracker.record_failure(Instant::now(), &reason.to_string());
                }
                tracing::warn!(%request_id, "Falling back for {} {}: {}", agent_id, decision_type, reason);
                let decision =
                    self.fallback
                        .generate(agent_id, decision_type, context, world, &mut self.rng);
                DecisionOutcome {
                    decision,
                    stage: DecisionStage::Fallback,
                    fallback_reason: Some(reason),
                }
            }
        }
    }

    async fn attempt(
        &mut self,
        request_id: Uuid,
        agent_id: &str,
        decision_type: DecisionType,
        context: &DecisionContext,
        world: Option<&WorldView<'_>>,
    ) -> Result<Decision, FallbackReason> {
        let Some(client) = self.client.as_deref() else {
            return Err(FallbackReason::NoCredential);
        };
        if self.config.fail_open {
            return Err(FallbackReason::FailOpen);
        }

        tracing::debug!(%request_id, "{}", DecisionStage::RateLimitWait);
        self.limiter.acquire().await;

        tracing::debug!(%request_id, "{}", DecisionStage::Calling);
        let prompt = build_prompt(agent_id, decision_type, context, world);
        let limit = self.config.request_timeout();
        let text = match timeout(limit, client.send(&prompt)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(FallbackReason::Transport(e.to_string())),
            Err(_) => return Err(FallbackReason::Transport(LlmError::Timeout(limit).to_string())),
        };

        tracing::debug!(%request_id, "{}", DecisionStage::Parsing);
        let value = extract_json(&text).map_err(FallbackReason::Parse)?;

        tracing::debug!(%request_id, "{}", DecisionStage::Validating);
        validate(decision_type, &value, context).map_err(FallbackReason::Schema)
    }

    /// Drains failure notices raised since the last call
    pub fn take_notices(&mut self) -> Vec<FailureNotice> {
        self.tracker.take_notices()
    }
}
