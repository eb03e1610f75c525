//! The `Tool` trait — a named capability consumed by the core.

use crate::error::ToolError;
use async_trait::async_trait;
use threadflow_context::ThreadContext;
use threadflow_types::Definition;

/// A named capability with a JSON-schema-described parameter contract.
///
/// `#[async_trait]` makes this object-safe so tools can be stored as
/// `Arc<dyn Tool>` in a [`crate::ToolRegistry`] regardless of their
/// concrete implementation (local closure, MCP-backed, HTTP-backed).
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name. Must pass
    /// [`crate::error::validate_tool_name`] — registries reject
    /// registration otherwise.
    fn name(&self) -> &str;

    /// Human-readable description surfaced to the model.
    fn description(&self) -> &str;

    /// JSON-schema-like definition of the tool's parameters.
    fn parameters(&self) -> Definition;

    /// Invoke the tool: `(context, parameters-bytes) -> (result-bytes |
    /// error)` per spec. `context` carries the calling thread's
    /// cancellation token and message history — most tools only need
    /// `parameters` and can ignore it.
    async fn call(
        &self,
        context: &ThreadContext,
        parameters: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError>;
}
