//! A scriptable `ContentGenerator` test double, the kind of scripted
//! fixture used across this workspace's example and test files. Behind
//! the `testing` feature — not part of the public surface.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use threadflow_core::{ContentGenerator, GeneratorError};
use threadflow_types::{Request, Response};
use tokio_util::sync::CancellationToken;

/// A `ContentGenerator` returning a pre-scripted sequence of responses,
/// one per call, in order. Panics (via `expect`) if called more times
/// than it was scripted for — tests should script exactly as many
/// responses as they expect calls.
pub struct MockGenerator {
    model_name: String,
    scripted: Mutex<VecDeque<Result<Response, String>>>,
}

impl MockGenerator {
    /// Build a generator that will answer from `responses`, in order.
    pub fn new(model_name: impl Into<String>, responses: Vec<Response>) -> Self {
        Self {
            model_name: model_name.into(),
            scripted: Mutex::new(responses.into_iter().map(Ok).collect()),
        }
    }

    /// Build a generator scripted for exactly one call, answering with
    /// `response`.
    pub fn fixed(model_name: impl Into<String>, response: Response) -> Self {
        Self::new(model_name, vec![response])
    }

    /// Append a scripted error response.
    #[must_use]
    pub fn and_then_error(self, message: impl Into<String>) -> Self {
        self.scripted.lock().unwrap().push_back(Err(message.into()));
        self
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate_content(
        &self,
        _token: &CancellationToken,
        _request: Request,
    ) -> Result<Response, GeneratorError> {
        let next = self
            .scripted
            .lock()
            .unwrap()
            .pop_front()
            .expect("MockGenerator called more times than scripted");
        next.map_err(GeneratorError::RequestFailed)
    }
}
