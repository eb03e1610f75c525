//! `ToolRegistry` — a process-scoped name -> `Tool` mapping.

use crate::error::{validate_tool_name, ToolError};
use crate::tool::Tool;
use std::collections::HashMap;
use std::sync::Arc;

/// A mapping from tool name to [`Tool`].
///
/// Unlike a plain `HashMap::insert`, [`ToolRegistry::register`] refuses a
/// duplicate name, failing rather than silently overwriting. Stable
/// iteration order is not required and is not provided (backed by
/// `HashMap`).
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Fails if the name is invalid (see
    /// [`validate_tool_name`]) or already present.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        validate_tool_name(tool.name())?;
        if self.tools.contains_key(tool.name()) {
            return Err(ToolError::DuplicateName(tool.name().to_string()));
        }
        self.tools.insert(tool.name().to_string(), tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// List every registered tool. Order is not stable.
    pub fn list(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.values()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry has no tools.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Names of every registered tool, used to build the
    /// "unknown tool, available tools are: ..." dispatcher message.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }
}

/// Assign `incoming` onto `slot`, enforcing the at-most-one-populated-
/// registry invariant: assigning a non-empty registry over an existing
/// non-empty one is forbidden.
pub fn assign_registry(
    slot: &mut Option<Arc<ToolRegistry>>,
    incoming: Arc<ToolRegistry>,
) -> Result<(), ToolError> {
    if let Some(existing) = slot {
        if !existing.is_empty() && !incoming.is_empty() {
            return Err(ToolError::RegistryConflict);
        }
    }
    *slot = Some(incoming);
    Ok(())
}
