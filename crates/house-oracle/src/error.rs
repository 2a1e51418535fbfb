//! Error types for the LLM boundary and response handling.

use std::time::Duration;

use thiserror::Error;

/// Failures talking to the external service
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no LLM credential configured")]
    MissingCredential,
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("response contained no text")]
    EmptyBody,
}

/// Failures turning response text into a decision
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseError {
    #[error("response contains no JSON object")]
    NotJson,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ResponseError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ResponseError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
