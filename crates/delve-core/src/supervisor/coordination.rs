use serde::{Deserialize, Serialize};

/// A unit of work owned by one agent.
pub trait AgentTask {
    /// Identifier of the agent running the task.
    fn agent_id(&self) -> &str;

    /// Human-readable description of the work.
    fn description(&self) -> &str;

    /// Runs the task and returns its outcome text.
    fn run(&self) -> String;
}

/// An agent task that simply reports its description as done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribedTask {
    pub agent_id: String,
    pub description: String,
}

impl DescribedTask {
    pub fn new(agent_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            description: description.into(),
        }
    }
}

impl AgentTask for DescribedTask {
    fn agent_id(&self) -> &str {
        &self.agent_id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn run(&self) -> String {
        tracing::info!("Agent {} starting: {}", self.agent_id, self.description);
        let outcome = format!("Completed: {}", self.description);
        tracing::info!("Agent {} finished: {}", self.agent_id, outcome);
        outcome
    }
}

/// What one agent reported back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutcome {
    pub agent_id: String,
    pub outcome: String,
}

/// Runs agent tasks one after another and logs each step.
#[derive(Debug, Default)]
pub struct TaskCoordinator {
    outcomes: Vec<AgentOutcome>,
}

impl TaskCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every task in order and returns their outcomes in the same order.
    pub fn coordinate<T: AgentTask>(&mut self, tasks: &[T]) -> Vec<AgentOutcome> {
        tracing::info!("Supervisor: Starting coordination of {} agents", tasks.len());

        let start = self.outcomes.len();
        for task in tasks {
            let outcome = task.run();
            tracing::info!("Supervisor: Agent {} outcome: {}", task.agent_id(), outcome);
            self.outcomes.push(AgentOutcome {
                agent_id: task.agent_id().to_string(),
                outcome,
            });
        }

        tracing::info!("Supervisor: Coordination complete");
        self.outcomes[start..].to_vec()
    }

    /// Every outcome recorded by this coordinator, across calls.
    pub fn outcomes(&self) -> &[AgentOutcome] {
        &self.outcomes
    }
}
