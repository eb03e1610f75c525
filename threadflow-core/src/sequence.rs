//! `Sequence` — deterministic, ordered composition.

use crate::error::ThreadError;
use crate::handler::{continue_with, BoxedHandler, ThreadHandler};
use crate::middleware::{run_with_middleware, Middleware};
use async_trait::async_trait;
use std::sync::Arc;
use threadflow_context::ThreadContext;

/// Runs child handlers in order, feeding each one the `ThreadContext`
/// returned by the previous one.
///
/// On the first child error, execution halts and the error is wrapped
/// with the sequence's name. Middleware registered via
/// [`Sequence::use_middleware`] wraps each child handler independently —
/// `mw-enter, h1, mw-exit, mw-enter, h2, mw-exit, ...` — not the sequence
/// as a whole.
pub struct Sequence {
    name: String,
    handlers: Vec<BoxedHandler>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Sequence {
    /// Build a sequence of `handlers`, run in the given order.
    pub fn new(name: impl Into<String>, handlers: Vec<BoxedHandler>) -> Self {
        Self {
            name: name.into(),
            handlers,
            middleware: Vec::new(),
        }
    }

    /// Register middleware, applied (reverse-order wrap, per crate docs)
    /// to each child handler independently.
    #[must_use]
    pub fn use_middleware(mut self, mw: Arc<dyn Middleware>) -> Self {
        self.middleware.push(mw);
        self
    }
}

#[async_trait]
impl ThreadHandler for Sequence {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        let mut current = tc;
        for (i, handler) in self.handlers.iter().enumerate() {
            tracing::debug!(sequence = %self.name, thread_id = %current.id(), step = i, "sequence: running child");
            current = run_with_middleware(handler.as_ref(), &self.middleware, current)
                .await
                .map_err(|e| e.wrap(&self.name))?;
        }
        continue_with(current, next).await
    }
}
