//! `Summarizer` — maintains a running summary of the thread across
//! invocations and folds it back in as the system message.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use threadflow_context::ThreadContext;
use threadflow_core::{
    continue_with, run_with_middleware, BoxedHandler, ContentGenerator, Middleware, ThreadError,
    ThreadHandler,
};
use threadflow_types::{Message, Request, Role};

/// Options controlling how [`Summarizer`] builds its prompt to the
/// generator.
#[derive(Debug, Clone, Default)]
pub struct SummarizerOptions {
    /// Prefix prepended to the prompt asking the generator to update the
    /// summary. Defaults to a generic instruction when empty.
    pub instruction: String,
}

/// Keeps a running summary of the thread, regenerated on every
/// invocation from the prior summary plus the current messages, and
/// folded back in by replacing (not appending) the thread's system
/// message with `system_msg + "\n\n<summary>" + summary + "</summary>"`.
///
/// The summary is owned by this handler instance (`Arc<Mutex<String>>`)
/// and persists across calls — never share one `Summarizer` instance
/// across concurrent branches; construct separate instances instead.
/// [`Summarizer::with_middleware`] clones this Arc,
/// so a handler built via `with_middleware` shares the same running
/// summary as its source — it is the same logical summarizer with an
/// extra middleware layer, not an independent one.
pub struct Summarizer {
    generator: Arc<dyn ContentGenerator>,
    system_msg: String,
    options: SummarizerOptions,
    summary: Arc<Mutex<String>>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Summarizer {
    /// Build a summarizer with an empty running summary.
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        system_msg: impl Into<String>,
        options: SummarizerOptions,
    ) -> Self {
        Self {
            generator,
            system_msg: system_msg.into(),
            options,
            summary: Arc::new(Mutex::new(String::new())),
            middleware: Vec::new(),
        }
    }

    /// The current running summary.
    pub fn summary(&self) -> String {
        self.summary.lock().unwrap().clone()
    }

    /// Append middleware in place, consuming `self`.
    #[must_use]
    pub fn use_middleware(mut self, mw: Arc<dyn Middleware>) -> Self {
        self.middleware.push(mw);
        self
    }

    /// Build a new handler sharing this summarizer's running summary
    /// plus `mw`, leaving `self` untouched.
    #[must_use]
    pub fn with_middleware(&self, mw: Arc<dyn Middleware>) -> Self {
        let mut middleware = self.middleware.clone();
        middleware.push(mw);
        Self {
            generator: Arc::clone(&self.generator),
            system_msg: self.system_msg.clone(),
            options: self.options.clone(),
            summary: Arc::clone(&self.summary),
            middleware,
        }
    }

    async fn summarize(&self, tc: &ThreadContext) -> Result<ThreadContext, ThreadError> {
        let prior = self.summary();
        let instruction = if self.options.instruction.is_empty() {
            "Update the running summary of this conversation.".to_string()
        } else {
            self.options.instruction.clone()
        };
        let prompt = format!(
            "{instruction}\n\nRunning summary so far:\n{prior}\n\nMessages:\n{}",
            tc.messages_json()
        );

        let request = Request::new(vec![Message::new(Role::User, prompt)]);
        let response = self
            .generator
            .generate_content(tc.cancellation(), request)
            .await
            .map_err(|e| ThreadError::Config(e.to_string()))?;

        *self.summary.lock().unwrap() = response.string().to_string();

        let new_system = format!(
            "{}\n\n<summary>{}</summary>",
            self.system_msg,
            self.summary()
        );
        let rest: Vec<Message> = tc
            .messages()
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned()
            .collect();
        let mut messages = vec![Message::system(new_system)];
        messages.extend(rest);
        Ok(tc.with_messages_replaced(messages))
    }
}

struct SummarizerCore<'a>(&'a Summarizer);

#[async_trait]
impl ThreadHandler for SummarizerCore<'_> {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        _next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        self.0.summarize(&tc).await
    }
}

#[async_trait]
impl ThreadHandler for Summarizer {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        let core = SummarizerCore(self);
        let out = run_with_middleware(&core, &self.middleware, tc)
            .await
            .map_err(|e| e.wrap("summarizer"))?;
        continue_with(out, next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_generator::MockGenerator;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn replaces_system_message_and_persists_summary() {
        let generator = Arc::new(MockGenerator::new(
            "mock",
            vec![
                threadflow_types::Response::text("user said hi"),
                threadflow_types::Response::text("user said hi, then bye"),
            ],
        ));
        let summarizer = Summarizer::new(generator, "You are a helpful assistant.", SummarizerOptions::default());

        let tc = ThreadContext::new(CancellationToken::new()).with_messages([
            Message::system("stale system message"),
            Message::new(Role::User, "hi"),
        ]);
        let out = summarizer.handle_thread(tc, None).await.unwrap();

        assert_eq!(out.messages().len(), 2);
        assert_eq!(out.messages()[0].role, Role::System);
        assert!(out.messages()[0].content.contains("<summary>user said hi</summary>"));
        assert_eq!(summarizer.summary(), "user said hi");

        let tc2 = out.with_messages([Message::new(Role::User, "bye")]);
        let out2 = summarizer.handle_thread(tc2, None).await.unwrap();
        assert!(out2.messages()[0].content.contains("user said hi, then bye"));
    }
}
