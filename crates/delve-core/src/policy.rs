use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the supervisor reacts when a researcher dispatch fails.
///
/// The policy is read once per orchestration step and never re-read mid-loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Skip the failed task and keep dispatching the rest.
    #[default]
    RecordAndContinue,
    /// Abort the whole step on the first failure.
    FailFast,
}

impl ErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPolicy::RecordAndContinue => "record_and_continue",
            ErrorPolicy::FailFast => "fail_fast",
        }
    }

    /// Returns true if a single failure should abort the step.
    pub fn aborts_on_failure(&self) -> bool {
        matches!(self, ErrorPolicy::FailFast)
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "record_and_continue" => Ok(ErrorPolicy::RecordAndContinue),
            "fail_fast" => Ok(ErrorPolicy::FailFast),
            other => Err(PolicyParseError(other.to_string())),
        }
    }
}

/// An error policy string outside the known values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown supervisor error policy '{0}' (expected 'record_and_continue' or 'fail_fast')")]
pub struct PolicyParseError(pub String);
