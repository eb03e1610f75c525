//! `Policy` — an LLM-backed guard that validates a thread before letting
//! it continue.
//!
//! State machine (documented, not reified as an enum — the transitions
//! map directly onto control flow): `Inbound -> Generating` on
//! `handle_thread` entry, `Generating -> Validated` on generator
//! success, `Validated -> Done` on `result_fn` acceptance (or, absent a
//! `result_fn`, on `valid == true`). Any error — generator failure,
//! response-parse failure, rejection — transitions directly to a
//! terminal error state the caller observes as `Err(ThreadError)`.

use async_trait::async_trait;
use std::sync::Arc;
use threadflow_context::ThreadContext;
use threadflow_core::{
    continue_with, run_with_middleware, BoxedHandler, ContentGenerator, Middleware, ThreadError,
    ThreadHandler,
};
use threadflow_types::{Definition, Message, Request, RequestOptions, Role, SchemaType};

/// The parsed result of a policy check.
#[derive(Debug, Clone)]
pub struct PolicyResult {
    /// Whether the thread passed the policy.
    pub valid: bool,
    /// Human-readable rationale from the generator.
    pub reason: String,
    /// The specific rule violated, if any (empty string if `valid`).
    pub violation: String,
}

/// Caller-supplied override deciding acceptance from a [`PolicyResult`].
/// Returning `Ok(())` accepts; `Err` rejects with that error.
pub type ResultFn = Arc<dyn Fn(&PolicyResult) -> Result<(), ThreadError> + Send + Sync>;

fn policy_schema() -> Definition {
    Definition::object([
        ("valid", Definition::scalar(SchemaType::Boolean)),
        ("reason", Definition::scalar(SchemaType::String)),
        ("violation", Definition::scalar(SchemaType::String)),
    ])
}

/// Sends `{system: system_prompt} + tc.messages()` to `generator` with a
/// response schema for `{valid, reason, violation}`; accepts (and
/// delegates to `next`) or rejects (returns
/// [`ThreadError::Validation`]) based on the parsed result, or on
/// `result_fn` if one was supplied.
pub struct Policy {
    generator: Arc<dyn ContentGenerator>,
    name: String,
    system_prompt: String,
    result_fn: Option<ResultFn>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Policy {
    /// Build a policy handler sending `system_prompt` ahead of the
    /// thread's messages on every check.
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        name: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            name: name.into(),
            system_prompt: system_prompt.into(),
            result_fn: None,
            middleware: Vec::new(),
        }
    }

    /// Override the default valid/reject decision with a caller-supplied
    /// `result_fn`.
    #[must_use]
    pub fn with_result_fn(mut self, result_fn: ResultFn) -> Self {
        self.result_fn = Some(result_fn);
        self
    }

    /// Append middleware in place, consuming `self`.
    #[must_use]
    pub fn use_middleware(mut self, mw: Arc<dyn Middleware>) -> Self {
        self.middleware.push(mw);
        self
    }

    /// Build a new handler identical to `self` plus `mw`, leaving `self`
    /// untouched.
    #[must_use]
    pub fn with_middleware(&self, mw: Arc<dyn Middleware>) -> Self {
        let mut middleware = self.middleware.clone();
        middleware.push(mw);
        Self {
            generator: Arc::clone(&self.generator),
            name: self.name.clone(),
            system_prompt: self.system_prompt.clone(),
            result_fn: self.result_fn.clone(),
            middleware,
        }
    }

    async fn check(&self, tc: &ThreadContext) -> Result<PolicyResult, ThreadError> {
        let mut messages = vec![Message::system(self.system_prompt.clone())];
        messages.extend(tc.messages().iter().cloned());

        let request = Request::new(messages).with_options(RequestOptions {
            response_schema: Some(policy_schema()),
            ..Default::default()
        });

        let response = self
            .generator
            .generate_content(tc.cancellation(), request)
            .await
            .map_err(|e| ThreadError::Validation {
                name: self.name.clone(),
                reason: e.to_string(),
            })?;

        let parsed: serde_json::Value =
            serde_json::from_str(response.string()).map_err(|e| ThreadError::Validation {
                name: self.name.clone(),
                reason: format!("invalid policy response: {e}"),
            })?;

        Ok(PolicyResult {
            valid: parsed.get("valid").and_then(serde_json::Value::as_bool).unwrap_or(false),
            reason: parsed
                .get("reason")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
            violation: parsed
                .get("violation")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

struct PolicyCore<'a>(&'a Policy);

#[async_trait]
impl ThreadHandler for PolicyCore<'_> {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        _next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        let result = self.0.check(&tc).await?;
        tracing::debug!(policy = %self.0.name, thread_id = %tc.id(), valid = result.valid, "policy: check complete");

        match &self.0.result_fn {
            Some(result_fn) => result_fn(&result)?,
            None if !result.valid => {
                return Err(ThreadError::Validation {
                    name: self.0.name.clone(),
                    reason: if result.reason.is_empty() {
                        result.violation.clone()
                    } else {
                        result.reason.clone()
                    },
                })
            }
            None => {}
        }

        Ok(tc)
    }
}

#[async_trait]
impl ThreadHandler for Policy {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        let core = PolicyCore(self);
        let out = run_with_middleware(&core, &self.middleware, tc)
            .await
            .map_err(|e| e.wrap(&self.name))?;
        continue_with(out, next).await
    }
}
