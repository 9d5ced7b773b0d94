//! Boundary adapter for inbound supervisor messages.
//!
//! Older call sites hand the supervisor messages in several shapes: typed
//! records with a `tool_calls` attribute, plain mappings, task lists nested
//! under `content`, or lists only visible through an attribute or
//! serialization dump. This module converts all of them into the canonical
//! [`SupervisorState`](crate::SupervisorState) once, so the supervisor core
//! only ever sees one shape.
//!
//! Lookup order for the task list (first match wins):
//!
//! 1. direct `tool_calls` attribute on the first message
//! 2. `tool_calls` key when the message is a mapping
//! 3. `tool_calls` inside the message `content`
//! 4. `tool_calls` in the message's attribute dump
//! 5. `tool_calls` in the serialized message, top level then `content`
//! 6. `tool_calls` key on the state itself
//! 7. otherwise no tasks
//!
//! A value that is not a list falls through to the next step. Inside a list,
//! an element that is not a well-formed tool call is kept without arguments,
//! so the supervisor reports it as a malformed task.

mod adapter;

pub use adapter::{
    extract_tool_calls, message_tool_calls, normalize, normalize_message, ContentView,
    ExtractionError, LegacyMessage, LegacyObject, RawSupervisorState, Strategy,
};
