#![deny(missing_docs)]
//! Prewired LLM-backed handlers for threadflow: [`Policy`], [`Summarizer`],
//! [`FreeformExtractor`], and [`StructuredExtractor`].
//!
//! Re-exports `ContentGenerator`/`GeneratorError` from `threadflow-core`
//! for convenience, since every handler here is built against that
//! contract.

mod freeform_extractor;
#[cfg(any(test, feature = "testing"))]
mod mock_generator;
mod policy;
mod structured_extractor;
mod summarizer;

pub use freeform_extractor::FreeformExtractor;
#[cfg(any(test, feature = "testing"))]
pub use mock_generator::MockGenerator;
pub use policy::{Policy, PolicyResult, ResultFn};
pub use structured_extractor::{NamedSchema, StructuredExtractor};
pub use summarizer::{Summarizer, SummarizerOptions};
pub use threadflow_core::{ContentGenerator, GeneratorError};
