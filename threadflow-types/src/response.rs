//! The polymorphic result a `ContentGenerator` produces.

use crate::message::{Message, Role, ToolCall};

/// Which shape a [`Response`] actually holds.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    /// Plain text completion.
    Text,
    /// The model requested one or more tool calls.
    ToolCall,
    /// A shape the core doesn't recognize; providers should avoid this,
    /// but the core must not panic on it.
    Unknown,
}

/// Result from a `ContentGenerator` call.
#[derive(Debug, Clone)]
pub struct Response {
    kind: ResponseKind,
    text: String,
    tool_calls: Vec<ToolCall>,
}

impl Response {
    /// Build a text response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Text,
            text: text.into(),
            tool_calls: vec![],
        }
    }

    /// Build a tool-call response.
    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            kind: ResponseKind::ToolCall,
            text: String::new(),
            tool_calls,
        }
    }

    /// Build a response whose shape the core does not recognize.
    pub fn unknown() -> Self {
        Self {
            kind: ResponseKind::Unknown,
            text: String::new(),
            tool_calls: vec![],
        }
    }

    /// Which variant this response is.
    pub fn kind(&self) -> ResponseKind {
        self.kind.clone()
    }

    /// The text payload, empty for non-text responses.
    pub fn string(&self) -> &str {
        &self.text
    }

    /// Tool calls requested by the model. Empty for non-tool-call
    /// responses.
    pub fn tool_calls_ref(&self) -> &[ToolCall] {
        &self.tool_calls
    }

    /// Project this response into `Message`s suitable for appending back
    /// into a thread.
    pub fn to_messages(&self) -> Vec<Message> {
        match self.kind {
            ResponseKind::Text => vec![Message::new(Role::Assistant, self.text.clone())],
            ResponseKind::ToolCall => {
                let mut msg = Message::new(Role::Assistant, self.text.clone());
                msg.tool_calls = self.tool_calls.clone();
                vec![msg]
            }
            ResponseKind::Unknown => vec![],
        }
    }
}
