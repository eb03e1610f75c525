//! `ThreadError` — the single error type every composable in this crate
//! returns.

use thiserror::Error;

/// Errors produced by the handler/middleware composition runtime.
///
/// Variants describe behavioral error kinds rather than wrapping type
/// names: cancellation is always propagated, handler/aggregation
/// failures are wrapped with the containing composable's name, tool-call
/// failures never surface here (they're inlined into tool-call results
/// by the dispatcher in `threadflow-tool`).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ThreadError {
    /// The cancellation token was tripped. Always propagated, never
    /// swallowed.
    #[error("cancelled")]
    Cancelled,

    /// A child handler returned an error, wrapped with the containing
    /// composable's name.
    #[error("{name}: {source}")]
    HandlerFailure {
        /// Name of the composable that observed the failure.
        name: String,
        /// The child handler's error.
        #[source]
        source: Box<ThreadError>,
    },

    /// `Must`'s aggregator itself failed.
    #[error("{name} aggregation: {message}")]
    Aggregation {
        /// Name of the `Must` composable.
        name: String,
        /// The aggregator's error message.
        message: String,
    },

    /// Every branch of a `First` failed.
    #[error("{name}: all handlers failed: {branch_errors:?}")]
    AllFailed {
        /// Name of the `First` composable.
        name: String,
        /// One message per failed branch, in branch order.
        branch_errors: Vec<String>,
    },

    /// A `Switch`/`If` condition itself returned an error.
    #[error("{name}: condition failed: {message}")]
    ConditionFailed {
        /// Name of the `Switch`/`If` composable.
        name: String,
        /// The condition's error message.
        message: String,
    },

    /// A Policy-style handler rejected the thread (`valid=false`, no
    /// `resultFn` override).
    #[error("{name}: validation failed: {reason}")]
    Validation {
        /// Name of the validating handler.
        name: String,
        /// The rejection reason reported by the generator.
        reason: String,
    },

    /// A construction-time invariant was violated (nil mandatory
    /// handler, conflicting registry assignment, invalid tool name).
    #[error("configuration error: {0}")]
    Config(String),

    /// Catch-all for errors from outside this crate (e.g. a
    /// `ContentGenerator` failure surfacing through a derived handler).
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ThreadError {
    /// Wrap `self` as a handler failure attributed to `name`, per the
    /// "<name>: <child-err>" convention every composable uses.
    #[must_use]
    pub fn wrap(self, name: impl Into<String>) -> ThreadError {
        ThreadError::HandlerFailure {
            name: name.into(),
            source: Box::new(self),
        }
    }
}
