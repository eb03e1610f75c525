//! Errors from tool registration, lookup, and invocation.

use thiserror::Error;

/// Errors from tool operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ToolError {
    /// `Tool::name()` fails the character-class/length check.
    #[error("invalid tool name {name:?}: {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// `ToolRegistry::register` was called with a name already present.
    #[error("tool already registered: {0}")]
    DuplicateName(String),

    /// A non-empty registry was assigned over an existing non-empty one.
    #[error("registry already populated, refusing to overwrite")]
    RegistryConflict,

    /// The requested tool was not found in the registry.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Tool execution failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The parameters provided to the tool were invalid.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Validate a tool name: non-empty, at most 64 bytes, first character
/// alphanumeric, subsequent characters limited to `{a-z,A-Z,0-9,_,.,-}`.
pub fn validate_tool_name(name: &str) -> Result<(), ToolError> {
    let fail = |reason: &str| {
        Err(ToolError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() {
        return fail("must not be empty");
    }
    if name.len() > 64 {
        return fail("must be at most 64 characters");
    }
    let mut chars = name.chars();
    let first = chars.next().expect("non-empty checked above");
    if !first.is_ascii_alphanumeric() {
        return fail("first character must be alphanumeric");
    }
    for c in chars {
        if !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
            return fail("characters after the first must be one of [a-zA-Z0-9_.-]");
        }
    }
    Ok(())
}
