//! `StructuredExtractor` — like [`crate::FreeformExtractor`], but against
//! a caller-provided schema, storing the whole parsed object under one
//! metadata key.

use async_trait::async_trait;
use std::sync::Arc;
use threadflow_context::ThreadContext;
use threadflow_core::{
    continue_with, run_with_middleware, BoxedHandler, ContentGenerator, Middleware, ThreadError,
    ThreadHandler,
};
use threadflow_types::{Definition, Message, Request, RequestOptions, Role};

/// A response schema paired with the metadata key its parsed result is
/// stored under. Plain `Definition` has no name of its own; this
/// pairing supplies one.
#[derive(Debug, Clone)]
pub struct NamedSchema {
    /// Metadata key the parsed object is written under.
    pub name: String,
    /// The schema itself.
    pub definition: Definition,
}

impl NamedSchema {
    /// Pair `name` with `definition`.
    pub fn new(name: impl Into<String>, definition: Definition) -> Self {
        Self {
            name: name.into(),
            definition,
        }
    }
}

/// Sends `{system: prompt}` plus every message rewritten as `"<role>:
/// <content>"` to `generator`, requesting a response conforming to
/// `schema.definition`, and stores the parsed object verbatim under
/// `metadata[schema.name]`.
pub struct StructuredExtractor {
    name: String,
    generator: Arc<dyn ContentGenerator>,
    prompt: String,
    schema: NamedSchema,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl StructuredExtractor {
    /// Build an extractor against `schema`.
    pub fn new(
        name: impl Into<String>,
        generator: Arc<dyn ContentGenerator>,
        prompt: impl Into<String>,
        schema: NamedSchema,
    ) -> Self {
        Self {
            name: name.into(),
            generator,
            prompt: prompt.into(),
            schema,
            middleware: Vec::new(),
        }
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
            name: self.name.clone(),
            generator: Arc::clone(&self.generator),
            prompt: self.prompt.clone(),
            schema: self.schema.clone(),
            middleware,
        }
    }

    async fn extract(&self, tc: &ThreadContext) -> Result<ThreadContext, ThreadError> {
        let mut messages = vec![Message::system(self.prompt.clone())];
        messages.extend(
            tc.messages()
                .iter()
                .map(|m| Message::new(Role::User, m.as_prompt_line())),
        );

        let request = Request::new(messages).with_options(RequestOptions {
            response_schema: Some(self.schema.definition.clone()),
            ..Default::default()
        });

        let response = self
            .generator
            .generate_content(tc.cancellation(), request)
            .await
            .map_err(|e| ThreadError::Config(e.to_string()))?;

        let parsed: serde_json::Value = serde_json::from_str(response.string())
            .map_err(|e| ThreadError::Config(format!("invalid extractor response: {e}")))?;

        let mut out = tc.isolated_clone();
        out.set_key_value(self.schema.name.clone(), parsed);
        Ok(out)
    }
}

struct ExtractorCore<'a>(&'a StructuredExtractor);

#[async_trait]
impl ThreadHandler for ExtractorCore<'_> {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        _next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        self.0.extract(&tc).await
    }
}

#[async_trait]
impl ThreadHandler for StructuredExtractor {
    async fn handle_thread(
        &self,
        tc: ThreadContext,
        next: Option<BoxedHandler>,
    ) -> Result<ThreadContext, ThreadError> {
        let core = ExtractorCore(self);
        let out = run_with_middleware(&core, &self.middleware, tc)
            .await
            .map_err(|e| e.wrap(&self.name))?;
        continue_with(out, next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_generator::MockGenerator;
    use serde_json::json;
    use threadflow_types::SchemaType;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn stores_parsed_object_under_schema_name() {
        let schema = NamedSchema::new(
            "invoice",
            Definition::object([
                ("total", Definition::scalar(SchemaType::Number)),
                ("currency", Definition::scalar(SchemaType::String)),
            ]),
        );
        let generator = Arc::new(MockGenerator::fixed(
            "mock",
            threadflow_types::Response::text(r#"{"total":42.5,"currency":"USD"}"#),
        ));
        let extractor = StructuredExtractor::new("e", generator, "extract the invoice", schema);
        let tc = ThreadContext::new(CancellationToken::new())
            .with_messages([Message::new(Role::User, "invoice total is $42.50")]);

        let out = extractor.handle_thread(tc, None).await.unwrap();
        assert_eq!(
            out.metadata().get("invoice"),
            Some(&json!({"total": 42.5, "currency": "USD"}))
        );
    }
}
