//! `Definition` — a JSON-schema-like tree describing tool parameters and
//! structured LLM response shapes.
//!
//! This is the core's consumer-side view of a schema. Generating one from a
//! Rust type (reflection) is an external collaborator's job; the core only
//! ever builds `Definition`s by hand or marshals ones it is given to JSON
//! when talking to a provider.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The JSON-schema primitive types `Definition` can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// UTF-8 string.
    String,
    /// Any JSON number.
    Number,
    /// A number with no fractional part.
    Integer,
    /// `true`/`false`.
    Boolean,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
    /// JSON `null`.
    Null,
}

/// A JSON-schema-like definition tree.
///
/// Intentionally a plain data structure rather than a builder — callers
/// construct it with struct-literal syntax or the small helper
/// constructors below, then hand it to a `ResponseSchema`/tool parameter
/// slot. [`Definition::to_json`] marshals it to the wire format providers
/// expect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Definition {
    /// The primitive type this node describes. `None` for a bare
    /// reference/placeholder node.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    /// Human-readable description surfaced to the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Object property definitions, keyed by property name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Definition>,
    /// Names of required object properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Element schema, for `SchemaType::Array` nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Definition>>,
    /// Allowed literal values, for enum-constrained nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub r#enum: Vec<serde_json::Value>,
}

impl Definition {
    /// An object schema with the given properties, all required.
    pub fn object(properties: impl IntoIterator<Item = (&'static str, Definition)>) -> Self {
        let properties: BTreeMap<String, Definition> = properties
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let required = properties.keys().cloned().collect();
        Self {
            schema_type: Some(SchemaType::Object),
            properties,
            required,
            ..Default::default()
        }
    }

    /// A bare scalar schema of the given type.
    pub fn scalar(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Default::default()
        }
    }

    /// An array schema whose elements match `items`.
    pub fn array(items: Definition) -> Self {
        Self {
            schema_type: Some(SchemaType::Array),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// Attach a description, builder-style.
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marshal to the JSON representation providers expect.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
