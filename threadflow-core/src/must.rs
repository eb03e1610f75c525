//! `Must` — non-deterministic parallel composition requiring every
//! branch to succeed, then aggregating their results.

use crate::error::ThreadError;
use crate::handler::{continue_with, BoxedHandler, ThreadHandler};
use crate::middleware::{run_with_middleware, Middleware};
use async_trait::async_trait;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::sync::Arc;
use threadflow_context::ThreadContext;

/// One branch's outcome, presented to the [`Aggregator`] in
/// declaration order after every branch has terminated successfully.
pub struct HandlerResult {
    /// 0-based position of this branch among `Must`'s handlers.
    pub index: usize,
    /// The branch's resulting context.
    pub context: ThreadContext,
}

/// Reduces the ordered list of successful branch results into a single
/// `ThreadContext`. Invoked only when every branch succeeded.
pub trait Aggregator: Send + Sync {
    /// Combine `results` (declaration order) into one context, or reject
    /// them.
    fn aggregate(&self, name: &str, results: Vec<HandlerResult>) -> Result<ThreadContext, ThreadError>;
}

/// The default aggregator: the first successful context is the base; for
/// each subsequent successful context, its metadata is merged into the
/// running base with `KeepNew` and its messages are appended. With
/// no results (e.g. `Must` constructed with zero handlers), aggregation
/// fails.
pub struct DefaultAggregator;

impl Aggregator for DefaultAggregator {
    fn aggregate(&self, name: &str, results: Vec<HandlerResult>) -> Result<ThreadContext, ThreadError> {
        let mut iter = results.into_iter();
        let Some(first) = iter.next() else {
            return Err(ThreadError::Aggregation {
                name: name.to_string(),
                message: "no results to aggregate".to_string(),
            });
        };
        let mut acc = first.context;
        for r in iter {
            acc = acc.with_metadata(r.context.metadata());
            acc = acc.with_messages(r.context.messages().iter().cloned());
        }
        Ok(acc)
    }
}

/// Runs handlers concurrently and requires every branch to succeed.
/// On the first branch failure, the shared child cancellation
/// token is tripped so remaining branches can abort early; `Must` still
/// waits for every branch to terminate before returning. If all succeed,
/// `aggregator` (defaulting to [`DefaultAggregator`]) combines the
/// per-branch results into one context.
pub struct Must {
    name: String,
    handlers: Vec<BoxedHandler>,
    aggregator: Arc<dyn Aggregator>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Must {
    /// Build a fan-out requiring all of `handlers` to succeed, using the
    /// [`DefaultAggregator`].
    pub fn new(name: impl Into<String>, handlers: Vec<BoxedHandler>) -> Self {
        Self {
            name: name.into(),
            handlers,
            aggregator: Arc::new(DefaultAggregator),
            middleware: Vec::new(),
        }
    }

    /// Supply a custom aggregator in place of [`DefaultAggregator`].
    #[must_use]
    pub fn with_aggregator(mut self, aggregator: Arc<dyn Aggregator>) -> Self {
        self.aggregator = aggregator;
        self
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
impl ThreadHandler for Must {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        if self.handlers.is_empty() {
            let aggregated = self.aggregator.aggregate(&self.name, vec![])?;
            return continue_with(aggregated, next).await;
        }

        let child_token = tc.cancellation().child_token();
        let mut joins = FuturesUnordered::new();
        for (i, handler) in self.handlers.iter().enumerate() {
            let branch_tc = tc.with_context(child_token.clone());
            let handler = Arc::clone(handler);
            let middleware = self.middleware.clone();
            joins.push(tokio::spawn(async move {
                let result = run_with_middleware(handler.as_ref(), &middleware, branch_tc).await;
                (i, result)
            }));
        }

        let mut slots: Vec<Option<Result<ThreadContext, ThreadError>>> =
            (0..self.handlers.len()).map(|_| None).collect();
        let mut first_error: Option<ThreadError> = None;

        while let Some(joined) = joins.next().await {
            match joined {
                Ok((i, Ok(branch_tc))) => slots[i] = Some(Ok(branch_tc)),
                Ok((i, Err(e))) => {
                    tracing::debug!(must = %self.name, thread_id = %tc.id(), index = i, "must: branch failed, cancelling siblings");
                    if first_error.is_none() {
                        first_error = Some(e.to_string().into());
                        child_token.cancel();
                    }
                    slots[i] = Some(Err(ThreadError::Config(e.to_string())));
                }
                Err(join_err) => {
                    if first_error.is_none() {
                        first_error = Some(join_err.to_string().into());
                        child_token.cancel();
                    }
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err.wrap(&self.name));
        }

        let results: Vec<HandlerResult> = slots
            .into_iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Some(Ok(context)) => Some(HandlerResult { index, context }),
                _ => None,
            })
            .collect();

        let aggregated = self.aggregator.aggregate(&self.name, results)?;
        continue_with(aggregated, next).await
    }
}

/// Lift a plain message into a `ThreadError` for the "first error
/// observed" bookkeeping above — join/branch errors are recorded as
/// opaque strings since `Must` only needs to report, not match on, them.
impl From<String> for ThreadError {
    fn from(message: String) -> Self {
        ThreadError::Config(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use serde_json::json;
    use threadflow_types::{Message, Role};
    use tokio_util::sync::CancellationToken;

    fn setting(key: &'static str, value: serde_json::Value, msg: &'static str) -> BoxedHandler {
        Arc::new(handler_fn(move |mut tc: ThreadContext, _next| {
            let value = value.clone();
            async move {
                tc.set_key_value(key, value);
                Ok(tc.with_messages([Message::new(Role::Assistant, msg)]))
            }
        }))
    }

    #[tokio::test]
    async fn default_aggregator_merges_metadata_and_appends_messages() {
        let must = Must::new(
            "m",
            vec![
                setting("k1", json!("v1"), "a"),
                setting("k2", json!("v2"), "b"),
            ],
        );
        let tc = ThreadContext::new(CancellationToken::new());
        let out = must.handle_thread(tc, None).await.unwrap();
        assert_eq!(out.metadata().get("k1"), Some(&json!("v1")));
        assert_eq!(out.metadata().get("k2"), Some(&json!("v2")));
        let contents: Vec<&str> = out.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn one_failure_fails_the_whole_group() {
        let failing: BoxedHandler = Arc::new(handler_fn(|_tc: ThreadContext, _next| async {
            Err(ThreadError::Config("boom".into()))
        }));
        let must = Must::new("m", vec![setting("k1", json!("v1"), "a"), failing]);
        let tc = ThreadContext::new(CancellationToken::new());
        let err = must.handle_thread(tc, None).await.unwrap_err();
        assert!(matches!(err, ThreadError::HandlerFailure { name, .. } if name == "m"));
    }

    #[tokio::test]
    async fn zero_handlers_aggregation_fails() {
        let must = Must::new("m", vec![]);
        let tc = ThreadContext::new(CancellationToken::new());
        let err = must.handle_thread(tc, None).await.unwrap_err();
        assert!(matches!(err, ThreadError::Aggregation { name, .. } if name == "m"));
    }
}
