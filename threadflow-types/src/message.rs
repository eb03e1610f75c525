//! Messages and tool calls — the content that flows through a [`crate::Metadata`]-carrying
//! thread.

use serde::{Deserialize, Serialize};

/// Who produced a [`Message`].
///
/// Kept as distinct tags rather than canonicalized (`Model` vs `Assistant`
/// are not merged into one variant) — provider adapters decide how their
/// wire format maps onto these, the core performs no rewriting.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System-level instruction.
    System,
    /// Human participant.
    User,
    /// The LLM, speaking under the provider's "assistant" tag.
    Assistant,
    /// The LLM, speaking under the provider's "model" tag (e.g. Gemini).
    Model,
    /// A function/tool result being fed back to the model.
    Function,
    /// A tool result, correlated to a prior tool call via `tool_call_id`.
    Tool,
}

/// A single tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier assigned by the model/provider for this call.
    pub id: String,
    /// The function the model wants invoked.
    pub function: ToolFunction,
}

/// The callable side of a [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolFunction {
    /// Name of the tool to invoke.
    pub name: String,
    /// Optional human-readable description, echoed back from the provider
    /// in some wire formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The LLM-produced argument JSON, opaque to the core.
    pub parameters: serde_json::Value,
    /// Filled in by the dispatcher after invocation. `None` until then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl ToolFunction {
    /// Build a not-yet-dispatched function call.
    pub fn new(name: impl Into<String>, parameters: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters,
            result: None,
        }
    }
}

/// A role-tagged utterance in a thread.
///
/// Invariant: a message with `role == Role::Tool` must carry a non-empty
/// `tool_call_id` (enforced by [`Message::tool_result`]; hand-built
/// messages are the caller's responsibility).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who is speaking.
    pub role: Role,
    /// Optional name, used to correlate function/tool messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The message body.
    pub content: String,
    /// Tool calls attached to this message, in the order the model emitted
    /// them. Usually only populated on assistant/model messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For `role == Role::Tool`, the id of the call this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// A plain message with no name, tool calls, or tool-call correlation.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            name: None,
            content: content.into(),
            tool_calls: vec![],
            tool_call_id: None,
        }
    }

    /// Convenience constructor for a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Convenience constructor for a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Convenience constructor for an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Build a `role == Tool` message correlated to `tool_call_id`.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            name: None,
            content: content.into(),
            tool_calls: vec![],
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// Render as `"<role>: <content>"`, the projection used by the
    /// freeform/structured extractors when building an LLM prompt.
    pub fn as_prompt_line(&self) -> String {
        format!("{}: {}", role_tag(self.role), self.content)
    }
}

fn role_tag(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Model => "model",
        Role::Function => "function",
        Role::Tool => "tool",
    }
}
