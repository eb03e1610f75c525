//! `First` — non-deterministic parallel composition: race to the first
//! success.

use crate::error::ThreadError;
use crate::handler::{continue_with, BoxedHandler, ThreadHandler};
use crate::middleware::{run_with_middleware, Middleware};
use async_trait::async_trait;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::sync::Arc;
use threadflow_context::ThreadContext;
use threadflow_types::reserved_keys;

/// Runs handlers concurrently and commits the first successful result;
/// remaining branches are canceled as soon as a success arrives.
///
/// Every branch shares a single child cancellation token derived from
/// the parent (`tc.cancellation().child_token()`). The winner cancels
/// that token so laggards observe cancellation promptly. If every
/// branch fails, the combined error lists every branch's failure.
/// If the parent token trips while branches are still racing, `First`
/// returns the parent's cancellation error instead of waiting out the
/// race.
pub struct First {
    name: String,
    handlers: Vec<BoxedHandler>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl First {
    /// Build a race over `handlers`, run in no particular order.
    pub fn new(name: impl Into<String>, handlers: Vec<BoxedHandler>) -> Self {
        Self {
            name: name.into(),
            handlers,
            middleware: Vec::new(),
        }
    }

    /// Register middleware, applied (reverse-order wrap) to each
    /// branch's handler.
    #[must_use]
    pub fn use_middleware(mut self, mw: Arc<dyn Middleware>) -> Self {
        self.middleware.push(mw);
        self
    }
}

#[async_trait]
impl ThreadHandler for First {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        if self.handlers.is_empty() {
            return continue_with(tc, next).await;
        }

        let parent_token = tc.cancellation().clone();
        let child_token = parent_token.child_token();

        let mut joins = FuturesUnordered::new();
        for (i, handler) in self.handlers.iter().enumerate() {
            let mut branch_tc = tc.with_context(child_token.clone());
            branch_tc.set_key_value(
                reserved_keys::HANDLER_NAME,
                serde_json::Value::String(format!("h{}", i + 1)),
            );
            let handler = Arc::clone(handler);
            let middleware = self.middleware.clone();
            joins.push(tokio::spawn(async move {
                run_with_middleware(handler.as_ref(), &middleware, branch_tc).await
            }));
        }

        let mut errors = Vec::new();
        loop {
            tokio::select! {
                biased;
                _ = parent_token.cancelled() => {
                    tracing::debug!(first = %self.name, thread_id = %tc.id(), "first: parent cancelled mid-race");
                    child_token.cancel();
                    return Err(ThreadError::Cancelled);
                }
                joined = joins.next() => {
                    match joined {
                        None => break,
                        Some(Ok(Ok(winner))) => {
                            tracing::debug!(first = %self.name, thread_id = %tc.id(), "first: branch succeeded");
                            child_token.cancel();
                            return continue_with(winner, next).await;
                        }
                        Some(Ok(Err(e))) => errors.push(e.to_string()),
                        Some(Err(join_err)) => errors.push(join_err.to_string()),
                    }
                }
            }
        }

        Err(ThreadError::AllFailed {
            name: self.name.clone(),
            branch_errors: errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn delayed(ms: u64, succeed: bool) -> BoxedHandler {
        Arc::new(handler_fn(move |tc: ThreadContext, _next| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            if succeed {
                Ok(tc)
            } else {
                Err(ThreadError::Config("branch failed".into()))
            }
        }))
    }

    #[tokio::test]
    async fn fastest_success_wins() {
        let first = First::new("f", vec![delayed(100, true), delayed(10, true)]);
        let tc = ThreadContext::new(CancellationToken::new());
        let result = first.handle_thread(tc, None).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn all_failures_reported() {
        let first = First::new("f", vec![delayed(5, false), delayed(5, false)]);
        let tc = ThreadContext::new(CancellationToken::new());
        let err = first.handle_thread(tc, None).await.unwrap_err();
        match err {
            ThreadError::AllFailed { name, branch_errors } => {
                assert_eq!(name, "f");
                assert_eq!(branch_errors.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_handlers_delegates_to_next() {
        let first = First::new("f", vec![]);
        let tc = ThreadContext::new(CancellationToken::new());
        let next: BoxedHandler = Arc::new(handler_fn(|tc: ThreadContext, _next| async move {
            Ok(tc.with_messages([threadflow_types::Message::new(
                threadflow_types::Role::Assistant,
                "next ran",
            )]))
        }));
        let out = first.handle_thread(tc, Some(next)).await.unwrap();
        assert_eq!(out.messages().last().unwrap().content, "next ran");
    }
}
