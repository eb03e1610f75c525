//! Handler middleware — `wrap(inner) -> wrapped-handler`, applied via a
//! `Next` chain in the same shape as `threadflow-tool`'s tool
//! middleware.
//!
//! Registering `use(A, B)` then invoking the wrapped handler yields
//! `A-enter -> B-enter -> handler -> B-exit -> A-exit`: the execution
//! order follows registration order because `Next::run` recurses through
//! the chain head-first, but the *wrapping* — each middleware closing
//! over the next layer in — happens innermost-first, i.e. in reverse of
//! registration. Every composable that supports `use(...)` builds its
//! `Next` chain the same way, so this invariant holds everywhere.

use crate::error::ThreadError;
use crate::handler::{BoxedHandler, ThreadHandler};
use async_trait::async_trait;
use std::sync::Arc;
use threadflow_context::ThreadContext;

/// A handler-wrapping middleware.
///
/// May observe/modify the context before delegating, short-circuit by
/// returning without calling `next.run(...)`, or call `next` more than
/// once to implement retries — as long as it only ever hands `next` a
/// fresh context each time, since `Next::run` consumes itself.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Process the context, optionally delegating to the rest of the
    /// chain via `next`.
    async fn process<'a>(
        &'a self,
        tc: ThreadContext,
        next: Next<'a>,
    ) -> Result<ThreadContext, ThreadError>;
}

/// The remaining middleware chain plus the terminal handler.
///
/// Consumed by [`Next::run`] so a middleware cannot invoke the
/// downstream chain twice through the same `Next` value — a middleware
/// that wants to retry builds a fresh chain rather than reusing this
/// exact `Next`.
pub struct Next<'a> {
    handler: &'a dyn ThreadHandler,
    chain: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    /// Build a `Next` over the remaining `chain` and terminal `handler`.
    pub fn new(handler: &'a dyn ThreadHandler, chain: &'a [Arc<dyn Middleware>]) -> Self {
        Self { handler, chain }
    }

    /// Continue the chain, eventually invoking the terminal handler with
    /// `next = None` (the outer `next` parameter belongs to whatever
    /// composable owns this invocation, not to the wrapped handler
    /// itself — see `apply_middleware`).
    pub async fn run(self, tc: ThreadContext) -> Result<ThreadContext, ThreadError> {
        if let Some((head, tail)) = self.chain.split_first() {
            let next = Next::new(self.handler, tail);
            head.process(tc, next).await
        } else {
            self.handler.handle_thread(tc, None).await
        }
    }
}

/// Run `handler` wrapped by `chain` (registration order) against `tc`.
pub async fn run_with_middleware(
    handler: &dyn ThreadHandler,
    chain: &[Arc<dyn Middleware>],
    tc: ThreadContext,
) -> Result<ThreadContext, ThreadError> {
    Next::new(handler, chain).run(tc).await
}

/// Wrap a closure as [`Middleware`] (the `mw_fn` ergonomic constructor,
/// mirroring `threadflow_tool::tool_middleware_fn`).
pub fn mw_fn<F, Fut>(f: F) -> impl Middleware
where
    F: for<'a> Fn(ThreadContext, Next<'a>) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<ThreadContext, ThreadError>> + Send,
{
    struct MwFn<F>(F);

    #[async_trait]
    impl<F, Fut> Middleware for MwFn<F>
    where
        F: for<'a> Fn(ThreadContext, Next<'a>) -> Fut + Send + Sync,
        Fut: std::future::Future<Output = Result<ThreadContext, ThreadError>> + Send,
    {
        async fn process<'a>(
            &'a self,
            tc: ThreadContext,
            next: Next<'a>,
        ) -> Result<ThreadContext, ThreadError> {
            (self.0)(tc, next).await
        }
    }

    MwFn(f)
}
