//! `ThreadFlow` — a top-level composer mimicking an HTTP router's
//! middleware scoping: global `use(...)`, appended `handle(...)`
//! handlers, and `group(...)` sub-flows whose middleware only wraps
//! their own handlers.

use crate::error::ThreadError;
use crate::handler::{continue_with, BoxedHandler, ThreadHandler};
use crate::middleware::{run_with_middleware, Middleware};
use async_trait::async_trait;
use std::sync::Arc;
use threadflow_context::ThreadContext;

/// A handler pre-wrapped with a fixed middleware chain, used to fold a
/// `group`'s handlers (already wrapped with the group's own middleware)
/// into a single handler the parent flow can append alongside its own.
struct MiddlewareWrapped {
    handler: BoxedHandler,
    middleware: Vec<Arc<dyn Middleware>>,
}

#[async_trait]
impl ThreadHandler for MiddlewareWrapped {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        let out = run_with_middleware(self.handler.as_ref(), &self.middleware, tc).await?;
        continue_with(out, next).await
    }
}

/// A scoped composer of handlers and middleware.
///
/// At execution time, each appended handler is wrapped with this flow's
/// global middleware (reverse order) and run sequentially — Sequence
/// semantics with per-handler middleware wrap. This guarantees:
/// global middleware runs once per handler (outermost layer); middleware
/// added inside a `group` runs once per handler inside that group
/// (innermost layer); handlers outside any group see only the global
/// middleware.
pub struct ThreadFlow {
    name: String,
    middleware: Vec<Arc<dyn Middleware>>,
    handlers: Vec<BoxedHandler>,
}

impl ThreadFlow {
    /// An empty flow with no middleware or handlers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            middleware: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Append global middleware, applied (reverse order) to every
    /// handler this flow runs, including handlers folded in from a
    /// `group`.
    #[must_use]
    pub fn use_middleware(mut self, mw: Arc<dyn Middleware>) -> Self {
        self.middleware.push(mw);
        self
    }

    /// Append a handler, run after every handler appended before it.
    #[must_use]
    pub fn handle(mut self, handler: BoxedHandler) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Build a fresh child flow, let `build` populate it with its own
    /// middleware and handlers, then fold each of the child's handlers —
    /// already wrapped with the child's own middleware, reverse order —
    /// into this flow as a single handler apiece.
    ///
    /// The child's middleware therefore wraps only the child's own
    /// handlers (inner layer); this flow's global middleware still wraps
    /// the folded-in handler when `self` eventually runs (outer layer).
    #[must_use]
    pub fn group(mut self, build: impl FnOnce(ThreadFlow) -> ThreadFlow) -> Self {
        let child_name = format!("{}/group", self.name);
        let child = build(ThreadFlow::new(child_name));
        for handler in child.handlers {
            self.handlers.push(Arc::new(MiddlewareWrapped {
                handler,
                middleware: child.middleware.clone(),
            }));
        }
        self
    }
}

#[async_trait]
impl ThreadHandler for ThreadFlow {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        let mut current = tc;
        for (i, handler) in self.handlers.iter().enumerate() {
            tracing::debug!(flow = %self.name, thread_id = %current.id(), step = i, "thread_flow: running handler");
            current = run_with_middleware(handler.as_ref(), &self.middleware, current)
                .await
                .map_err(|e| e.wrap(&self.name))?;
        }
        continue_with(current, next).await
    }
}
