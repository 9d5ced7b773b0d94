use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::state::SubTaskRequest;

/// What a research round should cover.
///
/// A scope is turned into `ConductResearch` sub-tasks with [`Scope::plan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Main subject of the research.
    pub topic: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Boundaries; each becomes its own sub-task.
    #[serde(default)]
    pub constraints: Vec<String>,
}

impl Scope {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            description: None,
            constraints: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    /// Splits the scope into research sub-tasks.
    ///
    /// One task per non-empty constraint; without constraints a single task
    /// covers the topic (and description, if any).
    pub fn plan(&self) -> Result<Vec<SubTaskRequest>, ScopeError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(ScopeError::EmptyTopic);
        }

        let constraints: Vec<&str> = self
            .constraints
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();

        if !constraints.is_empty() {
            return Ok(constraints
                .into_iter()
                .map(|c| {
                    SubTaskRequest::conduct_research(short_id(), format!("{} - constraint: {}", topic, c))
                })
                .collect());
        }

        let query = match self.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => format!("{}: {}", topic, description),
            _ => topic.to_string(),
        };

        Ok(vec![SubTaskRequest::conduct_research(short_id(), query)])
    }
}

/// First eight characters of a fresh v4 UUID.
fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("Scope topic must not be empty")]
    EmptyTopic,
}
