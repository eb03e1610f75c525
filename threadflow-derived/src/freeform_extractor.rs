//! `FreeformExtractor` — asks the generator for an open-ended list of
//! key/value pairs and writes them into the thread's metadata.

use async_trait::async_trait;
use std::sync::Arc;
use threadflow_context::ThreadContext;
use threadflow_core::{
    continue_with, run_with_middleware, BoxedHandler, ContentGenerator, Middleware, ThreadError,
    ThreadHandler,
};
use threadflow_types::{Definition, Message, Request, RequestOptions, Role, SchemaType};

fn pairs_schema() -> Definition {
    let pair = Definition::object([
        ("key", Definition::scalar(SchemaType::String)),
        ("value", Definition::scalar(SchemaType::String)),
    ]);
    Definition::object([("pairs", Definition::array(pair))])
}

/// Coerce a string value to the narrowest JSON type it parses as: `int`,
/// else `float`, else `bool`, else leave as a string.
fn coerce(value: &str) -> serde_json::Value {
    if let Ok(i) = value.parse::<i64>() {
        return serde_json::Value::from(i);
    }
    if let Ok(f) = value.parse::<f64>() {
        return serde_json::Value::from(f);
    }
    if let Ok(b) = value.parse::<bool>() {
        return serde_json::Value::from(b);
    }
    serde_json::Value::String(value.to_string())
}

/// Sends `{system: prompt}` plus every message rewritten as `"<role>:
/// <content>"` to `generator`, requesting `{pairs: [{key, value}]}`.
/// Each pair's `value` is coerced (int, then float, then bool, else left
/// as a string) and written into the returned context's metadata under
/// `pairs[i].key`.
pub struct FreeformExtractor {
    name: String,
    generator: Arc<dyn ContentGenerator>,
    prompt: String,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl FreeformExtractor {
    /// Build an extractor sending `prompt` as the system message on
    /// every call.
    pub fn new(name: impl Into<String>, generator: Arc<dyn ContentGenerator>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generator,
            prompt: prompt.into(),
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
            response_schema: Some(pairs_schema()),
            ..Default::default()
        });

        let response = self
            .generator
            .generate_content(tc.cancellation(), request)
            .await
            .map_err(|e| ThreadError::Config(e.to_string()))?;

        let parsed: serde_json::Value = serde_json::from_str(response.string())
            .map_err(|e| ThreadError::Config(format!("invalid extractor response: {e}")))?;

        let pairs = parsed
            .get("pairs")
            .and_then(serde_json::Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut out = tc.isolated_clone();
        for pair in pairs {
            let (Some(key), Some(value)) = (
                pair.get("key").and_then(serde_json::Value::as_str),
                pair.get("value").and_then(serde_json::Value::as_str),
            ) else {
                continue;
            };
            out.set_key_value(key, coerce(value));
        }
        Ok(out)
    }
}

struct ExtractorCore<'a>(&'a FreeformExtractor);

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
impl ThreadHandler for FreeformExtractor {
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
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn coerces_values_and_writes_metadata() {
        let generator = Arc::new(MockGenerator::fixed(
            "mock",
            threadflow_types::Response::text(
                r#"{"pairs":[{"key":"age","value":"29"},{"key":"score","value":"9.5"},{"key":"active","value":"true"},{"key":"name","value":"ada"}]}"#,
            ),
        ));
        let extractor = FreeformExtractor::new("e", generator, "extract facts");
        let tc = ThreadContext::new(CancellationToken::new())
            .with_messages([Message::new(Role::User, "I'm 29, scored 9.5, active: ada")]);

        let out = extractor.handle_thread(tc, None).await.unwrap();
        assert_eq!(out.metadata().get("age"), Some(&json!(29)));
        assert_eq!(out.metadata().get("score"), Some(&json!(9.5)));
        assert_eq!(out.metadata().get("active"), Some(&json!(true)));
        assert_eq!(out.metadata().get("name"), Some(&json!("ada")));
    }
}
