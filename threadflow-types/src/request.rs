//! Request/response types exchanged with a `ContentGenerator`.

use crate::message::Message;
use crate::schema::Definition;
use serde::{Deserialize, Serialize};

/// How the model should decide whether to call a tool.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model decides freely.
    Auto,
    /// The model must not call any tool.
    None,
    /// The model must call some tool.
    Required,
    /// The model must call this specific tool.
    Named(String),
}

/// Per-call overrides to a `ContentGenerator` invocation. Every field is
/// optional — `None` means "use the generator's default."
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Override the generator's configured model name for this call.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Cap on generated output tokens.
    pub max_output_tokens: Option<u32>,
    /// Require the response to conform to this schema.
    pub response_schema: Option<Definition>,
    /// Use this registry's tools instead of the generator's default.
    pub tool_registry_name: Option<String>,
    /// Tool-calling policy for this request.
    pub tool_choice: Option<ToolChoice>,
}

/// A caller-visible payload sent to a `ContentGenerator`.
#[derive(Debug, Clone)]
pub struct Request {
    /// The conversation so far.
    pub messages: Vec<Message>,
    /// Per-call overrides.
    pub options: RequestOptions,
}

impl Request {
    /// Build a request with default options.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            options: RequestOptions::default(),
        }
    }

    /// Attach options, builder-style.
    #[must_use]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}
