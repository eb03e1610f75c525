//! `For` — a bounded/conditional loop over a single handler.

use crate::error::ThreadError;
use crate::handler::{continue_with, BoxedHandler, ThreadHandler};
use crate::middleware::{run_with_middleware, Middleware};
use async_trait::async_trait;
use std::sync::Arc;
use threadflow_context::ThreadContext;
use threadflow_types::reserved_keys;

/// Predicate deciding whether `For` should run another iteration, given
/// the context as of the end of the previous one and the next 0-based
/// iteration index.
pub type ContinueFn = Arc<dyn Fn(&ThreadContext, u64) -> bool + Send + Sync>;

/// Runs `handler` up to `iterations` times (`0` means unbounded).
///
/// Before each iteration: a tripped cancellation token aborts immediately
/// (no new iteration starts); if a `continue_fn` is set and returns
/// `false`, the loop ends normally. The 0-based iteration index is
/// exposed on the context via the `iteration` metadata key before each
/// call. A handler error aborts the loop, wrapped as
/// `"<name>: iteration <i> failed: <err>"`.
pub struct For {
    name: String,
    iterations: u64,
    handler: BoxedHandler,
    continue_fn: Option<ContinueFn>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl For {
    /// Build a loop over `handler`. Fails fast (at construction, not at
    /// first run) if `handler` is somehow absent — in Rust this is
    /// enforced by the type system (`BoxedHandler` is required, not
    /// `Option`), so there is no runtime check to perform; the type
    /// signature *is* the invariant.
    pub fn new(name: impl Into<String>, iterations: u64, handler: BoxedHandler) -> Self {
        Self {
            name: name.into(),
            iterations,
            handler,
            continue_fn: None,
            middleware: Vec::new(),
        }
    }

    /// Attach a `continueFn(tc, iter) -> bool` predicate.
    #[must_use]
    pub fn with_continue(mut self, continue_fn: ContinueFn) -> Self {
        self.continue_fn = Some(continue_fn);
        self
    }

    /// Register middleware, applied (reverse-order wrap) to `handler` on
    /// every iteration.
    #[must_use]
    pub fn use_middleware(mut self, mw: Arc<dyn Middleware>) -> Self {
        self.middleware.push(mw);
        self
    }
}

#[async_trait]
impl ThreadHandler for For {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        let mut current = tc;
        let mut i: u64 = 0;
        loop {
            if self.iterations != 0 && i >= self.iterations {
                break;
            }
            if current.is_cancelled() {
                tracing::debug!(for_loop = %self.name, thread_id = %current.id(), iteration = i, "for: cancellation observed before iteration");
                return Err(ThreadError::Cancelled);
            }
            if let Some(cont) = &self.continue_fn {
                if !cont(&current, i) {
                    break;
                }
            }

            current.set_key_value(reserved_keys::ITERATION, i as i64);
            current = run_with_middleware(self.handler.as_ref(), &self.middleware, current)
                .await
                .map_err(|e| ThreadError::HandlerFailure {
                    name: format!("{}: iteration {} failed", self.name, i),
                    source: Box::new(e),
                })?;
            i += 1;
        }
        continue_with(current, next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio_util::sync::CancellationToken;

    fn counting_handler(counter: Arc<AtomicU64>) -> BoxedHandler {
        Arc::new(handler_fn(move |tc: ThreadContext, _next| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(tc)
            }
        }))
    }

    #[tokio::test]
    async fn continue_fn_bounds_iterations() {
        let counter = Arc::new(AtomicU64::new(0));
        let for_loop = For::new("loop", 5, counting_handler(Arc::clone(&counter)))
            .with_continue(Arc::new(|_tc, i| i < 2));

        let tc = ThreadContext::new(CancellationToken::new());
        for_loop.handle_thread(tc, None).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancellation_stops_before_next_iteration() {
        let counter = Arc::new(AtomicU64::new(0));
        let token = CancellationToken::new();
        let cancel_after_one = Arc::clone(&token);
        let handler: BoxedHandler = Arc::new(handler_fn(move |tc: ThreadContext, _next| {
            let counter = Arc::clone(&counter);
            let cancel_after_one = cancel_after_one.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    cancel_after_one.cancel();
                }
                Ok(tc)
            }
        }));

        let for_loop = For::new("loop", 0, handler);
        let tc = ThreadContext::new(token);
        let err = for_loop.handle_thread(tc, None).await.unwrap_err();
        assert!(matches!(err, ThreadError::Cancelled));
    }

    #[tokio::test]
    async fn iteration_index_exposed_in_metadata() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen2 = Arc::clone(&seen);
        let handler: BoxedHandler = Arc::new(handler_fn(move |tc: ThreadContext, _next| {
            let seen = Arc::clone(&seen2);
            async move {
                let iter = tc.metadata().get(reserved_keys::ITERATION).cloned();
                seen.lock().unwrap().push(iter);
                Ok(tc)
            }
        }));
        let for_loop = For::new("loop", 3, handler);
        let tc = ThreadContext::new(CancellationToken::new());
        for_loop.handle_thread(tc, None).await.unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Some(serde_json::json!(0)),
                Some(serde_json::json!(1)),
                Some(serde_json::json!(2)),
            ]
        );
    }
}
