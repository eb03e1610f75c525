//! The function-call dispatcher — invoked by provider adapters after a
//! response containing tool-call parts comes back from the model.

use crate::error::ToolError;
use crate::registry::ToolRegistry;
use threadflow_context::ThreadContext;
use threadflow_types::ToolCall;

/// Dispatch every call in `calls` against `registry`, filling in each
/// call's `function.result`.
///
/// An unknown tool name or a tool-execution error is surfaced *inline* in
/// `result` (a human-readable string) rather than aborting dispatch —
/// only a cancelled `context` returns an error. This is deliberate:
/// partial tool failures become model-observable next turn instead of
/// tearing down the whole generation.
pub async fn dispatch(
    context: &ThreadContext,
    registry: &ToolRegistry,
    mut calls: Vec<ToolCall>,
) -> Result<Vec<ToolCall>, ToolError> {
    for call in &mut calls {
        if context.is_cancelled() {
            tracing::debug!(thread_id = %context.id(), call_id = %call.id, "dispatch: cancellation observed mid-loop");
            return Err(ToolError::ExecutionFailed(
                "dispatch cancelled".to_string(),
            ));
        }

        let name = call.function.name.clone();
        match registry.lookup(&name) {
            None => {
                let available = registry.names().join(", ");
                tracing::warn!(thread_id = %context.id(), tool = %name, "dispatch: unknown tool");
                call.function.result = Some(serde_json::Value::String(format!(
                    "ERROR: unknown tool {name:?}. Available tools: [{available}]"
                )));
            }
            Some(tool) => {
                match tool.call(context, call.function.parameters.clone()).await {
                    Ok(result) => {
                        tracing::debug!(thread_id = %context.id(), tool = %name, "dispatch: tool succeeded");
                        call.function.result = Some(result);
                    }
                    Err(err) => {
                        tracing::warn!(thread_id = %context.id(), tool = %name, error = %err, "dispatch: tool failed");
                        call.function.result = Some(serde_json::Value::String(format!(
                            "ERROR: Tool {name} failed: {err}"
                        )));
                    }
                }
            }
        }
    }

    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::Tool;
    use async_trait::async_trait;
    use std::sync::Arc;
    use threadflow_types::{Definition, ToolFunction};
    use tokio_util::sync::CancellationToken;

    struct Double;

    #[async_trait]
    impl Tool for Double {
        fn name(&self) -> &str {
            "good"
        }
        fn description(&self) -> &str {
            "doubles x"
        }
        fn parameters(&self) -> Definition {
            Definition::default()
        }
        async fn call(
            &self,
            _ctx: &ThreadContext,
            parameters: serde_json::Value,
        ) -> Result<serde_json::Value, ToolError> {
            let x = parameters.get("x").and_then(|v| v.as_i64()).unwrap_or(0);
            Ok(serde_json::json!({ "result": x * 2 }))
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl Tool for AlwaysFails {
        fn name(&self) -> &str {
            "flaky"
        }
        fn description(&self) -> &str {
            "always errors"
        }
        fn parameters(&self) -> Definition {
            Definition::default()
        }
        async fn call(
            &self,
            _ctx: &ThreadContext,
            _parameters: serde_json::Value,
        ) -> Result<serde_json::Value, ToolError> {
            Err(ToolError::ExecutionFailed("boom".to_string()))
        }
    }

    fn call(id: &str, name: &str, params: serde_json::Value) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            function: ToolFunction::new(name, params),
        }
    }

    #[tokio::test]
    async fn mixed_dispatch_fills_every_result_without_aborting() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Double)).unwrap();
        registry.register(Arc::new(AlwaysFails)).unwrap();

        let ctx = ThreadContext::new(CancellationToken::new());
        let calls = vec![
            call("1", "unknown", serde_json::json!({})),
            call("2", "good", serde_json::json!({"x": 3})),
            call("3", "flaky", serde_json::json!({})),
        ];

        let results = dispatch(&ctx, &registry, calls).await.unwrap();
        assert_eq!(results.len(), 3);

        let unknown_result = results[0].function.result.as_ref().unwrap().as_str().unwrap();
        assert!(unknown_result.contains("unknown tool"));
        assert!(unknown_result.contains("good"));

        assert_eq!(
            results[1].function.result,
            Some(serde_json::json!({"result": 6}))
        );

        let flaky_result = results[2].function.result.as_ref().unwrap().as_str().unwrap();
        assert!(flaky_result.contains("ERROR: Tool flaky failed"));
    }

    #[tokio::test]
    async fn cancellation_aborts_dispatch() {
        let registry = ToolRegistry::new();
        let token = CancellationToken::new();
        let ctx = ThreadContext::new(token.clone());
        token.cancel();

        let calls = vec![call("1", "anything", serde_json::json!({}))];
        let err = dispatch(&ctx, &registry, calls).await.unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed(_)));
    }
}
