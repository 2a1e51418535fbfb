//! Decision Schemas
//!
//! Raw model output is deserialized into loose camelCase shapes, then
//! checked against the request context before it becomes a [`Decision`].

use house_events::{Decision, DecisionContext, DecisionType};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ResponseError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNomination {
    nominee1: Option<String>,
    nominee2: Option<String>,
    reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVeto {
    use_veto: Option<bool>,
    save_nominee: Option<String>,
    reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReplacement {
    nominee: Option<String>,
    reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvictionVote {
    vote_to_evict: Option<String>,
    reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawJuryVote {
    winner: Option<String>,
    reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDialogue {
    message: Option<String>,
    reasoning: Option<String>,
}

/// Checks a parsed response against the schema for `decision_type`
pub fn validate(
    decision_type: DecisionType,
    value: &Value,
    context: &DecisionContext,
) -> Result<Decision, ResponseError> {
    match decision_type {
        DecisionType::Nomination => {
            let raw: RawNomination = shape(value)?;
            let first = required(raw.nominee1, "nominee1")?;
            let second = required(raw.nominee2, "nominee2")?;
            member_of(&first, &context.eligible, "nominee1", "eligible")?;
            member_of(&second, &context.eligible, "nominee2", "eligible")?;
            if first == second {
                return Err(ResponseError::invalid("nominee2", "must differ from nominee1"));
            }
            Ok(Decision::Nomination {
                nominees: vec![first, second],
                reasoning: reasoning(raw.reasoning)?,
            })
        }
        DecisionType::Veto => {
            let raw: RawVeto = shape(value)?;
            let use_veto = raw.use_veto.ok_or(ResponseError::MissingField("useVeto"))?;
            let save_nominee = if use_veto {
                let saved = required(raw.save_nominee, "saveNominee")?;
                member_of(&saved, &context.nominees, "saveNominee", "nominees")?;
                Some(saved)
            } else {
                None
            };
            Ok(Decision::Veto {
                use_veto,
                save_nominee,
                reasoning: reasoning(raw.reasoning)?,
            })
        }
        DecisionType::Replacement => {
            let raw: RawReplacement = shape(value)?;
            let nominee = required(raw.nominee, "nominee")?;
            member_of(&nominee, &context.eligible, "nominee", "eligible")?;
            if context.nominees.contains(&nominee) {
                return Err(ResponseError::invalid("nominee", format!("{} is already nominated", nominee)));
            }
            Ok(Decision::Replacement {
                nominee: Some(nominee),
                reasoning: reasoning(raw.reasoning)?,
            })
        }
        DecisionType::EvictionVote => {
            let raw: RawEvictionVote = shape(value)?;
            let target = required(raw.vote_to_evict, "voteToEvict")?;
            member_of(&target, &context.nominees, "voteToEvict", "nominees")?;
            Ok(Decision::EvictionVote {
                vote_to_evict: Some(target),
                reasoning: reasoning(raw.reasoning)?,
            })
        }
        DecisionType::JuryVote => {
            let raw: RawJuryVote = shape(value)?;
            let winner = required(raw.winner, "winner")?;
            member_of(&winner, &context.finalists, "winner", "finalists")?;
            Ok(Decision::JuryVote {
                winner: Some(winner),
                reasoning: reasoning(raw.reasoning)?,
            })
        }
        DecisionType::Dialogue => {
            let raw: RawDialogue = shape(value)?;
            Ok(Decision::Dialogue {
                message: required(raw.message, "message")?,
                reasoning: reasoning(raw.reasoning)?,
            })
        }
    }
}

fn shape<T: DeserializeOwned>(value: &Value) -> Result<T, ResponseError> {
    T::deserialize(value).map_err(|e| ResponseError::invalid("response", e.to_string()))
}

/// Present and not blank
fn required(value: Option<String>, field: &'static str) -> Result<String, ResponseError> {
    let value = value.ok_or(ResponseError::MissingField(field))?;
    if value.trim().is_empty() {
        return Err(ResponseError::invalid(field, "must not be empty"));
    }
    Ok(value.trim().to_string())
}

fn reasoning(value: Option<String>) -> Result<String, ResponseError> {
    required(value, "reasoning")
}

fn member_of(
    value: &str,
    allowed: &[String],
    field: &'static str,
    set_name: &str,
) -> Result<(), ResponseError> {
    if allowed.iter().any(|a| a == value) {
        Ok(())
    } else {
        Err(ResponseError::invalid(field, format!("{} is not in {}", value, set_name)))
    }
}
