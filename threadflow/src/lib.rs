//! threadflow — a composable handler/middleware runtime for LLM
//! pipelines: route an evolving conversation state (a *thread* of
//! messages plus structured metadata) through a graph of handlers,
//! exactly as an HTTP router routes a request through middleware.
//!
//! This umbrella crate re-exports every layer behind feature flags (all
//! enabled by default except `testing`/`builtin-tools`, which pull in
//! test fixtures) and ships a [`prelude`] for the common case of wanting
//! everything at once.
//!
//! ```
//! use threadflow::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let h1 = Arc::new(handler_fn(|tc: ThreadContext, _next| async move {
//!     Ok(tc.with_messages([Message::new(Role::Assistant, "hi")]))
//! }));
//! let seq = Sequence::new("greet", vec![h1]);
//! let tc = ThreadContext::new(tokio_util::sync::CancellationToken::new());
//! let out = seq.handle_thread(tc, None).await.unwrap();
//! assert_eq!(out.messages().len(), 1);
//! # }
//! ```

#[cfg(feature = "types")]
pub use threadflow_types as types;

#[cfg(feature = "context")]
pub use threadflow_context as context;

#[cfg(feature = "tool")]
pub use threadflow_tool as tool;

#[cfg(feature = "core")]
pub use threadflow_core as core;

#[cfg(feature = "derived")]
pub use threadflow_derived as derived;

/// Everything needed to build and run a composition: the data model,
/// the handler/middleware interfaces, every composable, and (with the
/// `derived` feature, enabled by default) the prewired LLM-backed
/// handlers.
pub mod prelude {
    #[cfg(feature = "types")]
    pub use threadflow_types::{
        merge, reserved_keys, Definition, MergeStrategy, Message, Metadata, Request,
        RequestOptions, Response, ResponseKind, Role, SchemaType, ToolCall, ToolChoice,
        ToolFunction,
    };

    #[cfg(feature = "context")]
    pub use threadflow_context::ThreadContext;

    #[cfg(feature = "tool")]
    pub use threadflow_tool::{dispatch, Tool, ToolError, ToolMiddleware, ToolRegistry};

    #[cfg(feature = "core")]
    pub use threadflow_core::{
        continue_with, handler_fn, mw_fn, run_with_middleware, Aggregator, BoxedHandler, Case,
        Condition, ContentGenerator, ContinueFn, DefaultAggregator, First, For, GeneratorError,
        HandlerResult, If, LLMCondition, MetadataEquals, Middleware, Must, Next, Noop, Range,
        Sequence, Switch, ThreadError, ThreadFlow, ThreadHandler,
    };

    #[cfg(feature = "derived")]
    pub use threadflow_derived::{
        FreeformExtractor, NamedSchema, Policy, PolicyResult, ResultFn, StructuredExtractor,
        Summarizer, SummarizerOptions,
    };

    #[cfg(all(feature = "derived", any(test, feature = "testing")))]
    pub use threadflow_derived::MockGenerator;

    #[cfg(feature = "builtin-tools")]
    pub use threadflow_tool::builtin::{AddTool, EchoTool};
}
