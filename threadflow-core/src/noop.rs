//! `Noop` — returns the context unchanged, optionally delegating to
//! `next`. Used as a sentinel for `Switch`/`If` defaults.

use crate::error::ThreadError;
use crate::handler::{continue_with, BoxedHandler, ThreadHandler};
use async_trait::async_trait;
use threadflow_context::ThreadContext;

/// A handler that does nothing to its input, delegating to `next` if
/// present.
pub struct Noop;

#[async_trait]
impl ThreadHandler for Noop {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        continue_with(tc, next).await
    }
}
