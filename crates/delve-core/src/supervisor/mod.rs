//! The supervisor: dispatches research sub-tasks to researchers and decides
//! whether the research round continues.

mod coordination;
mod orchestrator;

pub use coordination::{AgentOutcome, AgentTask, DescribedTask, TaskCoordinator};
pub use orchestrator::{DispatchError, SupervisorOrchestrator};
