//! Major-decision orchestration: external model calls with rate limiting,
//! response parsing and schema checks, failure tracking, and a heuristic
//! fallback that keeps every request answerable.

pub mod config;
pub mod error;
pub mod fallback;
pub mod llm;
pub mod orchestrator;
pub mod parse;
pub mod prompt;
pub mod rate_limit;
pub mod schema;
pub mod tracker;

pub use config::{LlmConfig, OracleConfig, OracleConfigError};
pub use error::{LlmError, ResponseError};
pub use fallback::FallbackGenerator;
pub use llm::{HttpLlmClient, LlmClient, Prompt};
pub use orchestrator::{DecisionOutcome, DecisionStage, FallbackReason, Orchestrator};
pub use parse::extract_json;
pub use prompt::build_prompt;
pub use rate_limit::RateLimiter;
pub use schema::validate;
pub use tracker::{ErrorTracker, FailureNotice};
