//! `Range` — runs a handler once per value in a fixed list.

use crate::error::ThreadError;
use crate::handler::{continue_with, BoxedHandler, ThreadHandler};
use crate::middleware::{run_with_middleware, Middleware};
use async_trait::async_trait;
use std::sync::Arc;
use threadflow_context::ThreadContext;
use threadflow_types::reserved_keys;

/// Runs `handler` once per value in `values`, setting the `range_value`
/// metadata key to the current value before each invocation.
///
/// Cancellation and error semantics mirror [`crate::For`]: a tripped
/// token aborts before starting the next invocation, and a handler error
/// aborts the loop wrapped with the range's name. Middleware is applied
/// per iteration (reverse-order wrap).
pub struct Range {
    name: String,
    handler: BoxedHandler,
    values: Vec<serde_json::Value>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Range {
    /// Build a range over `values`, running `handler` once per value.
    pub fn new(
        name: impl Into<String>,
        handler: BoxedHandler,
        values: impl IntoIterator<Item = serde_json::Value>,
    ) -> Self {
        Self {
            name: name.into(),
            handler,
            values: values.into_iter().collect(),
            middleware: Vec::new(),
        }
    }

    /// Register middleware, applied (reverse-order wrap) per iteration.
    #[must_use]
    pub fn use_middleware(mut self, mw: Arc<dyn Middleware>) -> Self {
        self.middleware.push(mw);
        self
    }
}

#[async_trait]
impl ThreadHandler for Range {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        let mut current = tc;
        for (i, value) in self.values.iter().enumerate() {
            if current.is_cancelled() {
                tracing::debug!(range = %self.name, thread_id = %current.id(), index = i, "range: cancellation observed before iteration");
                return Err(ThreadError::Cancelled);
            }
            current.set_key_value(reserved_keys::RANGE_VALUE, value.clone());
            current = run_with_middleware(self.handler.as_ref(), &self.middleware, current)
                .await
                .map_err(|e| ThreadError::HandlerFailure {
                    name: format!("{}: value {}", self.name, i),
                    source: Box::new(e),
                })?;
        }
        continue_with(current, next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn sets_range_value_per_iteration() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen2 = std::sync::Arc::clone(&seen);
        let handler: BoxedHandler = Arc::new(handler_fn(move |tc: ThreadContext, _next| {
            let seen = std::sync::Arc::clone(&seen2);
            async move {
                seen.lock()
                    .unwrap()
                    .push(tc.metadata().get(reserved_keys::RANGE_VALUE).cloned());
                Ok(tc)
            }
        }));

        let range = Range::new(
            "r",
            handler,
            [
                serde_json::json!("a"),
                serde_json::json!("b"),
                serde_json::json!("c"),
            ],
        );
        let tc = ThreadContext::new(CancellationToken::new());
        range.handle_thread(tc, None).await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Some(serde_json::json!("a")),
                Some(serde_json::json!("b")),
                Some(serde_json::json!("c")),
            ]
        );
    }
}
