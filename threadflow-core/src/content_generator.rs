//! `ContentGenerator` — the single-shot LLM request/response boundary.
//!
//! Implementations (HTTP clients for OpenAI/Gemini/DeepSeek/Anthropic,
//! etc.) are out of scope here; this crate only defines the contract
//! `LLMCondition` and the derived handlers in `threadflow-derived`
//! consume.

use async_trait::async_trait;
use threadflow_types::{Request, Response};

/// Errors a `ContentGenerator` implementation may report.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The underlying request failed (network, auth, rate limit — the
    /// implementation's concern to distinguish further if it wants to).
    #[error("generation failed: {0}")]
    RequestFailed(String),

    /// The response could not be parsed into the shape the caller
    /// requested (e.g. a response schema violation).
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Single-shot request/response against an LLM provider.
///
/// `#[async_trait]` makes this object-safe so the core can hold
/// `Arc<dyn ContentGenerator>` without being generic over a concrete
/// provider implementation.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// The model name this generator is configured for.
    fn model_name(&self) -> &str;

    /// Send a single request and await the response.
    async fn generate_content(
        &self,
        token: &tokio_util::sync::CancellationToken,
        request: Request,
    ) -> Result<Response, GeneratorError>;

    /// Release any held resources. Idempotent.
    async fn close(&self) {}
}
