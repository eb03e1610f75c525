//! `If` — the binary specialization of [`crate::Switch`].

use crate::condition::Condition;
use crate::error::ThreadError;
use crate::handler::{BoxedHandler, ThreadHandler};
use crate::noop::Noop;
use crate::switch::{Case, Switch};
use async_trait::async_trait;
use std::sync::Arc;
use threadflow_context::ThreadContext;

/// Runs `true_handler` if `condition` evaluates `true`, otherwise
/// `false_handler` (defaulting to [`Noop`] when absent).
///
/// Implemented as a one-case [`Switch`] whose default is the
/// false-branch, so it inherits `Switch`'s middleware-wraps-the-
/// selected-handler-only behavior and condition-error propagation for
/// free.
pub struct If {
    inner: Switch,
}

impl If {
    /// Build a binary branch: `condition` picks `true_handler` or
    /// `false_handler` (falling back to [`Noop`] if `false_handler` is
    /// `None`).
    pub fn new(
        name: impl Into<String>,
        condition: Arc<dyn Condition>,
        true_handler: BoxedHandler,
        false_handler: Option<BoxedHandler>,
    ) -> Self {
        let name = name.into();
        let default = false_handler.unwrap_or_else(|| Arc::new(Noop));
        let inner = Switch::new(name, vec![Case::new(condition, true_handler)], Some(default));
        Self { inner }
    }
}

#[async_trait]
impl ThreadHandler for If {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        self.inner.handle_thread(tc, next).await
    }
}
