use serde_json::{Map, Value};
use thiserror::Error;

use crate::state::{SubTaskRequest, SupervisorMessage, SupervisorState};

const TOOL_CALLS_KEY: &str = "tool_calls";
const CONTENT_KEY: &str = "content";

/// Failure inside a single lookup strategy. Never leaves this module.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{strategy}: {message}")]
    Inspect {
        strategy: Strategy,
        message: String,
    },

    #[error("{strategy}: task list is not a list")]
    NotAList { strategy: Strategy },

    #[error("{strategy}: tool call does not have the expected shape: {source}")]
    Malformed {
        strategy: Strategy,
        #[source]
        source: serde_json::Error,
    },
}

/// The places a task list may live, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Attribute,
    Mapping,
    NestedContent,
    AttributeDump,
    SerializedDump,
    StateFallback,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::Attribute => "attribute",
            Strategy::Mapping => "mapping",
            Strategy::NestedContent => "nested content",
            Strategy::AttributeDump => "attribute dump",
            Strategy::SerializedDump => "serialized dump",
            Strategy::StateFallback => "state fallback",
        };
        f.write_str(name)
    }
}

/// The `content` of a legacy message.
pub enum ContentView<'a> {
    Text(&'a str),
    Mapping(&'a Map<String, Value>),
    Object(&'a dyn LegacyMessage),
}

/// A message in one of the shapes produced by older call sites.
///
/// Each method exposes one capability a message may or may not have. The
/// defaults report "not available", so an implementation only overrides
/// what its shape actually supports.
pub trait LegacyMessage {
    /// A typed task-list attribute.
    fn tool_calls_attr(&self) -> Result<Option<Value>, ExtractionError> {
        Ok(None)
    }

    /// The message itself viewed as a key-value mapping.
    fn as_mapping(&self) -> Option<&Map<String, Value>> {
        None
    }

    /// The message's `content` field.
    fn content(&self) -> Result<Option<ContentView<'_>>, ExtractionError> {
        Ok(None)
    }

    /// Every attribute set on the message instance.
    fn attributes(&self) -> Result<Option<Map<String, Value>>, ExtractionError> {
        Ok(None)
    }

    /// The message serialized to a plain mapping.
    fn dump(&self) -> Result<Option<Value>, ExtractionError> {
        Ok(None)
    }
}

impl LegacyMessage for Value {
    fn as_mapping(&self) -> Option<&Map<String, Value>> {
        self.as_object()
    }

    fn content(&self) -> Result<Option<ContentView<'_>>, ExtractionError> {
        Ok(self.get(CONTENT_KEY).and_then(content_view))
    }
}

/// A typed message record.
///
/// `tool_calls` is the declared attribute; `attributes` holds values
/// attached to the instance after construction. Only declared fields are
/// included in [`LegacyMessage::dump`].
#[derive(Debug, Clone, Default)]
pub struct LegacyObject {
    pub content: Value,
    pub tool_calls: Option<Value>,
    pub attributes: Map<String, Value>,
}

impl LegacyObject {
    pub fn new(content: impl Into<Value>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Value) -> Self {
        self.tool_calls = Some(tool_calls);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

impl LegacyMessage for LegacyObject {
    fn tool_calls_attr(&self) -> Result<Option<Value>, ExtractionError> {
        Ok(self.tool_calls.clone())
    }

    fn content(&self) -> Result<Option<ContentView<'_>>, ExtractionError> {
        Ok(content_view(&self.content))
    }

    fn attributes(&self) -> Result<Option<Map<String, Value>>, ExtractionError> {
        let mut all = self.attributes.clone();
        all.insert(CONTENT_KEY.to_string(), self.content.clone());
        if let Some(ref calls) = self.tool_calls {
            all.insert(TOOL_CALLS_KEY.to_string(), calls.clone());
        }
        Ok(Some(all))
    }

    fn dump(&self) -> Result<Option<Value>, ExtractionError> {
        let mut fields = Map::new();
        fields.insert(CONTENT_KEY.to_string(), self.content.clone());
        if let Some(ref calls) = self.tool_calls {
            fields.insert(TOOL_CALLS_KEY.to_string(), calls.clone());
        }
        Ok(Some(Value::Object(fields)))
    }
}

fn content_view(value: &Value) -> Option<ContentView<'_>> {
    match value {
        Value::String(text) => Some(ContentView::Text(text)),
        Value::Object(map) => Some(ContentView::Mapping(map)),
        _ => None,
    }
}

/// Supervisor state as it arrives from legacy call sites.
#[derive(Default)]
pub struct RawSupervisorState {
    pub supervisor_messages: Vec<Box<dyn LegacyMessage + Send + Sync>>,
    pub research_brief: String,
    pub research_iterations: u32,
    pub notes: Vec<String>,
    pub raw_notes: Vec<String>,
    /// Any other top-level keys, including a state-level `tool_calls`.
    pub extra: Map<String, Value>,
}

impl RawSupervisorState {
    /// Builds a raw state from a JSON document.
    ///
    /// Messages are kept as mappings; unknown top-level keys go to `extra`.
    pub fn from_json(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let messages = match fields.remove("supervisor_messages") {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|m| Box::new(m) as Box<dyn LegacyMessage + Send + Sync>)
                .collect(),
            _ => Vec::new(),
        };

        Self {
            supervisor_messages: messages,
            research_brief: take_string(&mut fields, "research_brief"),
            research_iterations: fields
                .remove("research_iterations")
                .and_then(|v| v.as_u64())
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
            notes: take_strings(&mut fields, "notes"),
            raw_notes: take_strings(&mut fields, "raw_notes"),
            extra: fields,
        }
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> String {
    match fields.remove(key) {
        Some(Value::String(s)) => s,
        _ => String::new(),
    }
}

fn take_strings(fields: &mut Map<String, Value>, key: &str) -> Vec<String> {
    match fields.remove(key) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Locates the task list in the first pending message, then in the state.
///
/// Never fails: a strategy that errors is logged and skipped, and an empty
/// list means there is nothing to dispatch.
pub fn extract_tool_calls(state: &RawSupervisorState) -> Vec<SubTaskRequest> {
    let first = state
        .supervisor_messages
        .first()
        .map(|m| &**m as &dyn LegacyMessage);

    if let Some(calls) = first.and_then(message_tool_calls) {
        return calls;
    }

    let fallback = lookup(Strategy::StateFallback, || {
        Ok(state.extra.get(TOOL_CALLS_KEY).cloned())
    });
    fallback.unwrap_or_default()
}

/// Runs strategies 1-5 against one message.
pub fn message_tool_calls(message: &dyn LegacyMessage) -> Option<Vec<SubTaskRequest>> {
    lookup(Strategy::Attribute, || message.tool_calls_attr())
        .or_else(|| {
            lookup(Strategy::Mapping, || {
                Ok(message.as_mapping().and_then(|m| m.get(TOOL_CALLS_KEY)).cloned())
            })
        })
        .or_else(|| lookup(Strategy::NestedContent, || nested_content_calls(message)))
        .or_else(|| {
            lookup(Strategy::AttributeDump, || {
                Ok(message
                    .attributes()?
                    .and_then(|mut attrs| attrs.remove(TOOL_CALLS_KEY)))
            })
        })
        .or_else(|| lookup(Strategy::SerializedDump, || serialized_calls(message)))
}

fn nested_content_calls(message: &dyn LegacyMessage) -> Result<Option<Value>, ExtractionError> {
    match message.content()? {
        Some(ContentView::Mapping(map)) => Ok(map.get(TOOL_CALLS_KEY).cloned()),
        Some(ContentView::Object(inner)) => inner.tool_calls_attr(),
        Some(ContentView::Text(_)) | None => Ok(None),
    }
}

fn serialized_calls(message: &dyn LegacyMessage) -> Result<Option<Value>, ExtractionError> {
    let Some(Value::Object(mut dumped)) = message.dump()? else {
        return Ok(None);
    };

    if let Some(calls) = dumped.remove(TOOL_CALLS_KEY) {
        return Ok(Some(calls));
    }

    Ok(match dumped.remove(CONTENT_KEY) {
        Some(Value::Object(mut content)) => content.remove(TOOL_CALLS_KEY),
        _ => None,
    })
}

/// Runs one strategy. `None` means "try the next one".
///
/// Only a missing value or a value that is not a list falls through. Each
/// element of a list is converted on its own, so one bad element never hides
/// its siblings.
fn lookup<F>(strategy: Strategy, find: F) -> Option<Vec<SubTaskRequest>>
where
    F: FnOnce() -> Result<Option<Value>, ExtractionError>,
{
    let raw = match find() {
        Ok(Some(Value::Null)) | Ok(None) => return None,
        Ok(Some(value)) => value,
        Err(e) => {
            tracing::debug!(%strategy, error = %e, "Tool-call lookup failed, trying next strategy");
            return None;
        }
    };

    let Value::Array(items) = raw else {
        let e = ExtractionError::NotAList { strategy };
        tracing::debug!(error = %e, "Ignoring unusable tool-call list");
        return None;
    };

    let calls: Vec<SubTaskRequest> = items
        .into_iter()
        .map(|item| tool_call(strategy, item))
        .collect();
    tracing::trace!(%strategy, count = calls.len(), "Found tool calls");
    Some(calls)
}

/// Converts one list element.
///
/// An element that does not fit becomes a request with no arguments, which
/// then fails at dispatch as a malformed task.
fn tool_call(strategy: Strategy, item: Value) -> SubTaskRequest {
    let id = item
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match serde_json::from_value::<SubTaskRequest>(item) {
        Ok(call) => call,
        Err(source) => {
            let e = ExtractionError::Malformed { strategy, source };
            tracing::debug!(task_id = %id, error = %e, "Keeping malformed tool call for dispatch");
            SubTaskRequest {
                id,
                ..SubTaskRequest::default()
            }
        }
    }
}

/// Converts one legacy message to the canonical shape.
pub fn normalize_message(message: &dyn LegacyMessage) -> SupervisorMessage {
    let content = match message.content() {
        Ok(Some(ContentView::Text(text))) => text.to_string(),
        Ok(Some(ContentView::Mapping(map))) => map
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    };

    SupervisorMessage {
        content,
        tool_calls: message_tool_calls(message),
    }
}

/// Converts a raw state to the canonical [`SupervisorState`].
///
/// After normalization `SupervisorState::pending_tasks` yields the same list
/// as [`extract_tool_calls`] on the raw state.
pub fn normalize(state: RawSupervisorState) -> SupervisorState {
    let tool_calls = lookup(Strategy::StateFallback, || {
        Ok(state.extra.get(TOOL_CALLS_KEY).cloned())
    });

    SupervisorState {
        supervisor_messages: state
            .supervisor_messages
            .iter()
            .map(|m| normalize_message(&**m))
            .collect(),
        research_brief: state.research_brief,
        research_iterations: state.research_iterations,
        notes: state.notes,
        raw_notes: state.raw_notes,
        tool_calls,
    }
}
