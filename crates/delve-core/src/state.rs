use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::CONDUCT_RESEARCH_TOOL;

/// Context passed into one orchestration step.
///
/// Created by the caller for each round. The supervisor reads it but never
/// mutates it; changes come back as a [`StateUpdate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorState {
    /// Inbound directives. Only the first one is consulted per step.
    pub supervisor_messages: Vec<SupervisorMessage>,
    /// The overarching research goal.
    pub research_brief: String,
    /// Rounds executed so far. Incremented by the caller.
    pub research_iterations: u32,
    /// Compressed findings accumulated across rounds.
    pub notes: Vec<String>,
    /// Raw researcher notes accumulated across rounds.
    pub raw_notes: Vec<String>,
    /// State-level task list, consulted when the first message carries none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<SubTaskRequest>>,
}

impl SupervisorState {
    /// Creates an empty state for the given research brief.
    pub fn new(research_brief: impl Into<String>) -> Self {
        Self {
            research_brief: research_brief.into(),
            ..Self::default()
        }
    }

    /// Adds a message to the end of the pending queue.
    pub fn with_message(mut self, message: SupervisorMessage) -> Self {
        self.supervisor_messages.push(message);
        self
    }

    /// Sets the state-level task list.
    pub fn with_tool_calls(mut self, tool_calls: Vec<SubTaskRequest>) -> Self {
        self.tool_calls = Some(tool_calls);
        self
    }

    /// Returns the sub-tasks to dispatch this round.
    ///
    /// The first message's task list wins when present (even if empty);
    /// otherwise the state-level list is used; otherwise there is nothing
    /// to do.
    pub fn pending_tasks(&self) -> &[SubTaskRequest] {
        self.supervisor_messages
            .first()
            .and_then(|m| m.tool_calls.as_deref())
            .or(self.tool_calls.as_deref())
            .unwrap_or(&[])
    }
}

/// Canonical inbound directive.
///
/// Legacy message shapes are converted to this once, at the boundary, by
/// [`crate::message::normalize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorMessage {
    /// Free-text content of the message.
    pub content: String,
    /// Sub-task requests carried by the message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<SubTaskRequest>>,
}

impl SupervisorMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: None,
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<SubTaskRequest>) -> Self {
        self.tool_calls = Some(tool_calls);
        self
    }
}

/// One unit of dispatchable work.
///
/// Every field is optional on the wire so a malformed call still parses and
/// fails at dispatch time instead of hiding the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubTaskRequest {
    /// Task kind identifier.
    pub name: String,
    /// Correlation id, used for logging only.
    pub id: String,
    /// Tool arguments. `research_topic` is required at dispatch.
    pub args: Map<String, Value>,
}

impl SubTaskRequest {
    /// Creates a `ConductResearch` request for the given topic.
    pub fn conduct_research(id: impl Into<String>, topic: impl Into<String>) -> Self {
        let mut args = Map::new();
        args.insert("research_topic".to_string(), Value::String(topic.into()));
        Self {
            name: CONDUCT_RESEARCH_TOOL.to_string(),
            id: id.into(),
            args,
        }
    }

    /// Returns the research topic, if present and a string.
    pub fn research_topic(&self) -> Option<&str> {
        self.args.get("research_topic").and_then(Value::as_str)
    }
}

/// Where the caller should route next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Routing {
    /// Loop back into the supervisor.
    #[serde(rename = "supervisor")]
    ContinueToSupervisor,
    /// End the research round.
    #[serde(rename = "__end__")]
    Terminate,
}

impl Routing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Routing::ContinueToSupervisor => "supervisor",
            Routing::Terminate => "__end__",
        }
    }
}

/// State patch produced by a completed step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    /// Reserved for messages emitted by collaborators. Always empty.
    pub supervisor_messages: Vec<SupervisorMessage>,
    /// Raw notes from successful researchers, in task order.
    pub raw_notes: Vec<String>,
    /// Compressed summaries from successful researchers, in task order.
    pub compressed_research: Vec<String>,
}

impl StateUpdate {
    /// Folds this patch into the caller's state.
    ///
    /// Raw notes extend `raw_notes`; compressed research extends `notes`.
    pub fn apply_to(&self, state: &mut SupervisorState) {
        state.raw_notes.extend(self.raw_notes.iter().cloned());
        state.notes.extend(self.compressed_research.iter().cloned());
    }
}

/// Output of one orchestration step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Where to go next.
    pub routing: Routing,
    /// Aggregated results. `None` when the step aborted.
    pub update: Option<StateUpdate>,
}

impl Decision {
    pub fn continue_with(update: StateUpdate) -> Self {
        Self {
            routing: Routing::ContinueToSupervisor,
            update: Some(update),
        }
    }

    pub fn terminate() -> Self {
        Self {
            routing: Routing::Terminate,
            update: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.routing == Routing::Terminate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pending_tasks_prefers_first_message() {
        let state = SupervisorState::new("brief")
            .with_message(
                SupervisorMessage::new("go")
                    .with_tool_calls(vec![SubTaskRequest::conduct_research("a", "from message")]),
            )
            .with_tool_calls(vec![SubTaskRequest::conduct_research("b", "from state")]);

        let tasks = state.pending_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].research_topic(), Some("from message"));
    }

    #[test]
    fn test_pending_tasks_falls_back_to_state() {
        let state = SupervisorState::new("brief")
            .with_message(SupervisorMessage::new("no calls here"))
            .with_tool_calls(vec![SubTaskRequest::conduct_research("b", "from state")]);

        assert_eq!(state.pending_tasks()[0].id, "b");
    }

    #[test]
    fn test_empty_message_list_wins_over_state() {
        let state = SupervisorState::new("brief")
            .with_message(SupervisorMessage::new("none").with_tool_calls(vec![]))
            .with_tool_calls(vec![SubTaskRequest::conduct_research("b", "from state")]);

        assert!(state.pending_tasks().is_empty());
    }

    #[test]
    fn test_only_first_message_is_consulted() {
        let state = SupervisorState::new("brief")
            .with_message(SupervisorMessage::new("first"))
            .with_message(
                SupervisorMessage::new("second")
                    .with_tool_calls(vec![SubTaskRequest::conduct_research("x", "ignored")]),
            );

        assert!(state.pending_tasks().is_empty());
    }

    #[test]
    fn test_malformed_task_parses() {
        let task: SubTaskRequest =
            serde_json::from_value(json!({"name": "ConductResearch", "id": "t9", "args": {}}))
                .unwrap();
        assert_eq!(task.research_topic(), None);

        let task: SubTaskRequest =
            serde_json::from_value(json!({"args": {"research_topic": 42}})).unwrap();
        assert_eq!(task.research_topic(), None);
    }

    #[test]
    fn test_routing_wire_names() {
        assert_eq!(
            serde_json::to_value(Routing::ContinueToSupervisor).unwrap(),
            json!("supervisor")
        );
        assert_eq!(serde_json::to_value(Routing::Terminate).unwrap(), json!("__end__"));
        assert_eq!(Routing::Terminate.as_str(), "__end__");
    }

    #[test]
    fn test_apply_update() {
        let mut state = SupervisorState::new("brief");
        state.raw_notes.push("old".to_string());

        let update = StateUpdate {
            supervisor_messages: vec![],
            raw_notes: vec!["n1".to_string(), "n2".to_string()],
            compressed_research: vec!["s1".to_string()],
        };
        update.apply_to(&mut state);

        assert_eq!(state.raw_notes, vec!["old", "n1", "n2"]);
        assert_eq!(state.notes, vec!["s1"]);
        assert_eq!(state.research_iterations, 0);
    }
}
