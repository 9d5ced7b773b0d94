pub mod config;
pub mod message;
pub mod policy;
pub mod scope;
pub mod state;
pub mod supervisor;
pub mod telemetry;
pub mod worker;

pub use config::{Config, ConfigError, LoggingConfig, ResearcherConfig, SupervisorConfig};
pub use policy::ErrorPolicy;
pub use scope::{Scope, ScopeError};
pub use state::{Decision, Routing, StateUpdate, SubTaskRequest, SupervisorMessage, SupervisorState};
pub use supervisor::{DispatchError, SupervisorOrchestrator, TaskCoordinator};
pub use telemetry::init_tracing;
pub use worker::{MockResearcher, ResearchWorker, ResearcherOutput, ResearcherRequest, WorkerError};
