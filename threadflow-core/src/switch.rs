//! `Switch` — conditional branching over an ordered list of cases.

use crate::condition::Condition;
use crate::error::ThreadError;
use crate::handler::{continue_with, BoxedHandler, ThreadHandler};
use crate::middleware::{run_with_middleware, Middleware};
use async_trait::async_trait;
use std::sync::Arc;
use threadflow_context::ThreadContext;

/// One `Switch` branch: a condition and the handler to run if it is the
/// first (in declaration order) to evaluate `true`.
pub struct Case {
    condition: Arc<dyn Condition>,
    handler: BoxedHandler,
}

impl Case {
    /// Pair a condition with the handler it selects.
    pub fn new(condition: Arc<dyn Condition>, handler: BoxedHandler) -> Self {
        Self { condition, handler }
    }
}

/// Evaluates `cases` in declaration order and invokes the first whose
/// condition is `true`; subsequent conditions are not evaluated.
///
/// If every condition is `false`, `default` (if present) runs; otherwise
/// the input context is returned unchanged. A condition that errors
/// aborts the switch with that error, wrapped with the switch's name.
/// Middleware registered on `Switch` wraps only the selected handler —
/// applied reverse-order at dispatch time, never the condition
/// evaluation itself.
pub struct Switch {
    name: String,
    cases: Vec<Case>,
    default: Option<BoxedHandler>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Switch {
    /// Build a switch over `cases`, falling back to `default` (if any)
    /// when no case matches.
    pub fn new(name: impl Into<String>, cases: Vec<Case>, default: Option<BoxedHandler>) -> Self {
        Self {
            name: name.into(),
            cases,
            default,
            middleware: Vec::new(),
        }
    }

    /// Register middleware, applied (reverse-order wrap) to whichever
    /// handler dispatch selects.
    #[must_use]
    pub fn use_middleware(mut self, mw: Arc<dyn Middleware>) -> Self {
        self.middleware.push(mw);
        self
    }
}

#[async_trait]
impl ThreadHandler for Switch {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        for case in &self.cases {
            let matched = case
                .condition
                .evaluate(&tc)
                .await
                .map_err(|e| ThreadError::ConditionFailed {
                    name: self.name.clone(),
                    message: e.to_string(),
                })?;
            if matched {
                tracing::debug!(switch = %self.name, thread_id = %tc.id(), "switch: case matched");
                let out = run_with_middleware(case.handler.as_ref(), &self.middleware, tc)
                    .await
                    .map_err(|e| e.wrap(&self.name))?;
                return continue_with(out, next).await;
            }
        }

        match &self.default {
            Some(handler) => {
                tracing::debug!(switch = %self.name, thread_id = %tc.id(), "switch: falling back to default");
                let out = run_with_middleware(handler.as_ref(), &self.middleware, tc)
                    .await
                    .map_err(|e| e.wrap(&self.name))?;
                continue_with(out, next).await
            }
            None => continue_with(tc, next).await,
        }
    }
}
