//! Conditions consumed by [`crate::Switch`]/[`crate::If`].
//!
//! A second polymorphic surface alongside `ThreadHandler`/`Middleware`:
//! implementers decide whether a branch should fire. `Condition` itself
//! is public (not sealed) so callers can supply their own, mirroring the
//! rest of this workspace's pluggable seams (`Tool`, `Middleware`,
//! `Aggregator`).

use crate::content_generator::ContentGenerator;
use crate::error::ThreadError;
use async_trait::async_trait;
use std::sync::Arc;
use threadflow_context::ThreadContext;
use threadflow_types::{Definition, Message, Request, Role, SchemaType};

/// A predicate evaluated against a [`ThreadContext`] to pick a branch in
/// [`crate::Switch`]/[`crate::If`].
///
/// An error aborts the containing `Switch`/`If` rather than being
/// treated as "false" — a condition error propagates, wrapped with the
/// switch's name.
#[async_trait]
pub trait Condition: Send + Sync {
    /// Evaluate the condition against `tc`.
    async fn evaluate(&self, tc: &ThreadContext) -> Result<bool, ThreadError>;
}

/// True iff `tc`'s metadata contains `key` and its value structurally
/// equals `value`.
pub struct MetadataEquals {
    /// Metadata key to look up.
    pub key: String,
    /// Value to compare against (JSON structural equality).
    pub value: serde_json::Value,
}

impl MetadataEquals {
    /// Build a condition comparing `key` against `value`.
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[async_trait]
impl Condition for MetadataEquals {
    async fn evaluate(&self, tc: &ThreadContext) -> Result<bool, ThreadError> {
        Ok(tc.metadata().get(&self.key) == Some(&self.value))
    }
}

/// Sends `prompt` plus the last message's content to a `ContentGenerator`
/// with a response schema declaring a single boolean field `bool`, and
/// treats the parsed value as the condition's result.
///
/// The request is `{RoleUser: prompt, RoleSystem: "Previous message: "
/// + last-message-content}`. Generator errors and JSON parse errors
/// both propagate as [`ThreadError::ConditionFailed`].
pub struct LLMCondition {
    generator: Arc<dyn ContentGenerator>,
    prompt: String,
}

impl LLMCondition {
    /// Build a condition that asks `generator` to answer `prompt` as a
    /// boolean.
    pub fn new(generator: Arc<dyn ContentGenerator>, prompt: impl Into<String>) -> Self {
        Self {
            generator,
            prompt: prompt.into(),
        }
    }

    fn bool_schema() -> Definition {
        Definition::object([("bool", Definition::scalar(SchemaType::Boolean))])
    }
}

#[async_trait]
impl Condition for LLMCondition {
    async fn evaluate(&self, tc: &ThreadContext) -> Result<bool, ThreadError> {
        let previous = tc
            .messages()
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let request = Request::new(vec![
            Message::new(Role::User, self.prompt.clone()),
            Message::new(Role::System, format!("Previous message: {previous}")),
        ])
        .with_options(threadflow_types::RequestOptions {
            response_schema: Some(Self::bool_schema()),
            ..Default::default()
        });

        let response = self
            .generator
            .generate_content(tc.cancellation(), request)
            .await
            .map_err(|e| ThreadError::ConditionFailed {
                name: "llm_condition".to_string(),
                message: e.to_string(),
            })?;

        let parsed: serde_json::Value =
            serde_json::from_str(response.string()).map_err(|e| ThreadError::ConditionFailed {
                name: "llm_condition".to_string(),
                message: format!("invalid boolean response: {e}"),
            })?;

        parsed
            .get("bool")
            .and_then(serde_json::Value::as_bool)
            .ok_or_else(|| ThreadError::ConditionFailed {
                name: "llm_condition".to_string(),
                message: "response missing boolean `bool` field".to_string(),
            })
    }
}
