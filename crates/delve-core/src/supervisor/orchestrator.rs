use std::sync::Arc;

use thiserror::Error;
use tracing::Instrument;

use crate::policy::ErrorPolicy;
use crate::state::{Decision, StateUpdate, SubTaskRequest, SupervisorState};
use crate::worker::{ResearchWorker, ResearcherOutput, ResearcherRequest, WorkerError};

/// Dispatches pending research sub-tasks and decides where to route next.
///
/// One call to [`step`](Self::step) is one orchestration round: every
/// pending task is sent to the researcher once, in order, and successful
/// outputs are folded into a [`StateUpdate`]. Failures never escape; the
/// [`ErrorPolicy`] decides whether they are skipped or end the round.
pub struct SupervisorOrchestrator {
    worker: Option<Arc<dyn ResearchWorker>>,
}

impl Default for SupervisorOrchestrator {
    fn default() -> Self {
        Self::unconfigured()
    }
}

impl SupervisorOrchestrator {
    /// Creates an orchestrator backed by the given researcher.
    pub fn new(worker: Arc<dyn ResearchWorker>) -> Self {
        Self {
            worker: Some(worker),
        }
    }

    /// Creates an orchestrator with no researcher.
    ///
    /// Every dispatch then fails with [`DispatchError::NoWorker`] and goes
    /// through the error policy like any other failure.
    pub fn unconfigured() -> Self {
        Self { worker: None }
    }

    /// Replaces the researcher.
    pub fn with_worker(mut self, worker: Arc<dyn ResearchWorker>) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Returns true if a researcher is configured.
    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    /// Runs one orchestration round over the state's pending tasks.
    ///
    /// Tasks are dispatched sequentially in their original order. Under
    /// `FailFast` the first failure ends the round with `Terminate` and no
    /// update; results gathered before it are discarded.
    pub async fn step(&self, state: &SupervisorState, policy: ErrorPolicy) -> Decision {
        let tasks = state.pending_tasks();
        let span = tracing::info_span!(
            "supervisor_step",
            iteration = state.research_iterations,
            tasks = tasks.len(),
            policy = %policy
        );

        self.run_tasks(tasks, policy).instrument(span).await
    }

    async fn run_tasks(&self, tasks: &[SubTaskRequest], policy: ErrorPolicy) -> Decision {
        let mut round = Round::new(policy);

        for task in tasks {
            match self.dispatch(task).await {
                Ok(output) => {
                    tracing::debug!(task_id = %task.id, "Researcher finished");
                    if let Some(summary) = output.compressed_research {
                        round.compressed_research.push(summary);
                    }
                    if let Some(notes) = output.raw_notes {
                        round.raw_notes.extend(notes);
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        task_id = %task.id,
                        topic = task.research_topic().unwrap_or("<missing>"),
                        error = %error,
                        policy = %policy,
                        "Researcher dispatch failed"
                    );
                    round.record_failure();
                    if round.phase == Phase::Aborted {
                        break;
                    }
                }
            }
        }

        round.complete();
        let decision = round.finish();
        tracing::info!(
            routing = decision.routing.as_str(),
            summaries = decision.update.as_ref().map_or(0, |u| u.compressed_research.len()),
            "Supervisor step finished"
        );
        decision
    }

    async fn dispatch(
        &self,
        task: &SubTaskRequest,
    ) -> Result<ResearcherOutput, DispatchError> {
        let worker = self.worker.as_ref().ok_or(DispatchError::NoWorker)?;
        let topic = task
            .research_topic()
            .ok_or_else(|| DispatchError::MalformedTask {
                task_id: task.id.clone(),
            })?;

        tracing::debug!(task_id = %task.id, topic, "Dispatching researcher");
        let output = worker.research(ResearcherRequest::for_topic(topic)).await?;
        Ok(output)
    }
}

/// Why a single dispatch failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no researcher is configured for the supervisor")]
    NoWorker,

    #[error("tool call '{task_id}' has no research_topic")]
    MalformedTask { task_id: String },

    #[error(transparent)]
    Worker(#[from] WorkerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Aborted,
    Completed,
}

/// Per-step aggregation state. Never outlives one `step` call.
struct Round {
    policy: ErrorPolicy,
    phase: Phase,
    raw_notes: Vec<String>,
    compressed_research: Vec<String>,
}

impl Round {
    fn new(policy: ErrorPolicy) -> Self {
        Self {
            policy,
            phase: Phase::Running,
            raw_notes: Vec::new(),
            compressed_research: Vec::new(),
        }
    }

    fn record_failure(&mut self) {
        if self.policy.aborts_on_failure() {
            self.phase = Phase::Aborted;
        }
    }

    /// Marks the task list as exhausted. No-op after an abort.
    fn complete(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Completed;
        }
    }

    fn finish(self) -> Decision {
        match self.phase {
            Phase::Aborted => Decision::terminate(),
            Phase::Running | Phase::Completed => Decision::continue_with(StateUpdate {
                supervisor_messages: Vec::new(),
                raw_notes: self.raw_notes,
                compressed_research: self.compressed_research,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Routing;

    #[test]
    fn test_round_completes_without_failures() {
        let mut round = Round::new(ErrorPolicy::FailFast);
        round.compressed_research.push("s".to_string());

        round.complete();
        let decision = round.finish();
        assert_eq!(decision.routing, Routing::ContinueToSupervisor);
        assert_eq!(decision.update.unwrap().compressed_research, vec!["s"]);
    }

    #[test]
    fn test_round_aborts_only_under_fail_fast() {
        let mut round = Round::new(ErrorPolicy::RecordAndContinue);
        round.record_failure();
        assert_eq!(round.phase, Phase::Running);

        let mut round = Round::new(ErrorPolicy::FailFast);
        round.compressed_research.push("before".to_string());
        round.record_failure();
        assert_eq!(round.phase, Phase::Aborted);
        round.complete();
        assert_eq!(round.phase, Phase::Aborted);
        assert_eq!(round.finish(), Decision::terminate());
    }

    #[test]
    fn test_dispatch_error_messages() {
        assert!(DispatchError::NoWorker.to_string().contains("no researcher"));
        let err = DispatchError::MalformedTask {
            task_id: "t2".to_string(),
        };
        assert!(err.to_string().contains("t2"));
    }
}
