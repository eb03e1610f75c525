//! Middleware for the tool-invocation pipeline.
//!
//! Mirrors the handler middleware in `threadflow-core`: a `Next` holding
//! the remaining middleware chain plus the terminal tool, consumed on
//! use so `next` fires at most once per call.

use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use std::sync::Arc;
use threadflow_context::ThreadContext;

/// Middleware wrapping a single tool invocation.
///
/// Can inspect/modify the parameters before delegating, short-circuit by
/// returning without calling `next.run(...)`, or post-process the result.
#[async_trait]
pub trait ToolMiddleware: Send + Sync {
    /// Process one call, optionally delegating to the rest of the chain.
    async fn process<'a>(
        &'a self,
        context: &'a ThreadContext,
        parameters: serde_json::Value,
        next: Next<'a>,
    ) -> Result<serde_json::Value, ToolError>;
}

/// The remaining middleware chain plus the tool being wrapped.
///
/// Consumed by [`Next::run`] to prevent a middleware from invoking the
/// chain twice.
pub struct Next<'a> {
    tool: &'a dyn Tool,
    chain: &'a [Arc<dyn ToolMiddleware>],
}

impl<'a> Next<'a> {
    /// Build a `Next` over the full middleware chain and terminal tool.
    pub fn new(tool: &'a dyn Tool, chain: &'a [Arc<dyn ToolMiddleware>]) -> Self {
        Self { tool, chain }
    }

    /// Continue the chain, eventually invoking the tool.
    pub async fn run(
        self,
        context: &'a ThreadContext,
        parameters: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        if let Some((head, tail)) = self.chain.split_first() {
            let next = Next::new(self.tool, tail);
            head.process(context, parameters, next).await
        } else {
            self.tool.call(context, parameters).await
        }
    }
}

/// Run `tool` through `chain` (registered in the order middleware should
/// fire — entry order matches registration, exit is the reverse).
pub async fn run_with_middleware(
    tool: &dyn Tool,
    chain: &[Arc<dyn ToolMiddleware>],
    context: &ThreadContext,
    parameters: serde_json::Value,
) -> Result<serde_json::Value, ToolError> {
    Next::new(tool, chain).run(context, parameters).await
}
