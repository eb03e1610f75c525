//! A couple of demonstration tools used by integration tests and
//! examples across the workspace. Not part of the public surface.

use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use threadflow_context::ThreadContext;
use threadflow_types::{Definition, SchemaType};

/// Echoes its input back as the result.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes the input parameters back unchanged."
    }

    fn parameters(&self) -> Definition {
        Definition::object([("value", Definition::scalar(SchemaType::String))])
    }

    async fn call(
        &self,
        _context: &ThreadContext,
        parameters: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        Ok(parameters)
    }
}

/// Adds two numbers given as `{"a": ..., "b": ...}`.
pub struct AddTool;

#[async_trait]
impl Tool for AddTool {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Adds two numbers."
    }

    fn parameters(&self) -> Definition {
        Definition::object([
            ("a", Definition::scalar(SchemaType::Number)),
            ("b", Definition::scalar(SchemaType::Number)),
        ])
    }

    async fn call(
        &self,
        _context: &ThreadContext,
        parameters: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let a = parameters
            .get("a")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| ToolError::InvalidInput("missing field `a`".to_string()))?;
        let b = parameters
            .get("b")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| ToolError::InvalidInput("missing field `b`".to_string()))?;
        Ok(serde_json::json!({ "sum": a + b }))
    }
}
