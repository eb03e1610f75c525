//! `ThreadHandler` — the universal composable interface.

use crate::error::ThreadError;
use async_trait::async_trait;
use std::sync::Arc;
use threadflow_context::ThreadContext;

/// A handler wrapped for storage in a composable: `Arc<dyn ThreadHandler>`.
pub type BoxedHandler = Arc<dyn ThreadHandler>;

/// The universal composable interface every handler and composition
/// implements.
///
/// `next` is the downstream handler, if any. An implementation may
/// invoke it zero or one times with whatever `ThreadContext` it likes.
/// Returning `Err` terminates the current composition branch; returning
/// `Ok(tc)` commits `tc` as the result.
#[async_trait]
pub trait ThreadHandler: Send + Sync {
    /// Run this handler against `tc`, optionally delegating to `next`.
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError>;
}

/// Wrap an `async fn(ThreadContext, Option<BoxedHandler>) -> Result<...>`
/// closure as a [`ThreadHandler`], the ergonomic equivalent of
/// `tool_middleware_fn` for plain (non-middleware) handlers.
pub fn handler_fn<F, Fut>(f: F) -> impl ThreadHandler
where
    F: Fn(ThreadContext, Option<BoxedHandler>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<ThreadContext, ThreadError>> + Send + 'static,
{
    struct FnHandler<F>(F);

    #[async_trait]
    impl<F, Fut> ThreadHandler for FnHandler<F>
    where
        F: Fn(ThreadContext, Option<BoxedHandler>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<ThreadContext, ThreadError>> + Send + 'static,
    {
        async fn handle_thread(
            &self,
            tc: ThreadContext,
            next: Option<BoxedHandler>,
        ) -> Result<ThreadContext, ThreadError> {
            (self.0)(tc, next).await
        }
    }

    FnHandler(f)
}

/// Run `handler`, then — if it succeeds and `next` is present — run
/// `next` with the result. Shared by every composable's "after I'm done,
/// delegate to next" tail behavior; public so derived handlers outside
/// this crate can reuse the same convention.
pub async fn continue_with(
    tc: ThreadContext,
    next: Option<BoxedHandler>,
) -> Result<ThreadContext, ThreadError> {
    match next {
        Some(next) => next.handle_thread(tc, None).await,
        None => Ok(tc),
    }
}
