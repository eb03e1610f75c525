//! Thread metadata: an opaque string-keyed bag of scalars/maps/lists, plus
//! the merge strategy [`Must`](threadflow-core) uses to combine branch
//! results.

use serde_json::Value;
use std::collections::HashMap;

/// Metadata keys the runtime itself reserves. User/middleware code may
/// read these but should avoid writing them outside the composables that
/// own them.
pub mod reserved_keys {
    /// Set by `Range` to the current iteration's value.
    pub const RANGE_VALUE: &str = "range_value";
    /// Set by `For` to the current 0-based iteration index.
    pub const ITERATION: &str = "iteration";
    /// Set by `First` on each branch's context clone (`"h1"`, `"h2"`, ...).
    pub const HANDLER_NAME: &str = "handler_name";
}

/// A string-keyed bag of arbitrary JSON values.
///
/// Keys have no enumerated schema beyond the handful the runtime reserves
/// (see [`reserved_keys`]). Backed by a `HashMap` rather than an ordered
/// map — iteration order over metadata is not meaningful, unlike the
/// message list, which is order-preserving.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata(HashMap<String, Value>);

/// How [`merge`] resolves key collisions between two metadata maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Keys already present in the base (`a`) win.
    KeepOld,
    /// Keys from the incoming map (`b`) win, overwriting `a`.
    KeepNew,
}

impl Metadata {
    /// An empty metadata bag.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the given key is present. Absence is always permitted —
    /// callers must not assume reserved keys are set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Set a key, returning the map for chaining.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set a key in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over key/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Combine `a` and `b` according to `strategy`.
///
/// `KeepNew` means keys in `b` overwrite keys in `a`; `KeepOld` is the
/// reverse. This is the binary operation Must's default aggregator folds
/// over branch results with `KeepNew`.
pub fn merge(a: &Metadata, b: &Metadata, strategy: MergeStrategy) -> Metadata {
    // HashMap::extend overwrites existing keys with the incoming ones, so
    // the map whose keys should win goes last.
    let mut result = HashMap::new();
    match strategy {
        MergeStrategy::KeepNew => {
            result.extend(a.0.clone());
            result.extend(b.0.clone());
        }
        MergeStrategy::KeepOld => {
            result.extend(b.0.clone());
            result.extend(a.0.clone());
        }
    }
    Metadata(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keep_new_overwrites() {
        let a = Metadata::new().with("k", json!("old")).with("only_a", json!(1));
        let b = Metadata::new().with("k", json!("new")).with("only_b", json!(2));
        let merged = merge(&a, &b, MergeStrategy::KeepNew);
        assert_eq!(merged.get("k"), Some(&json!("new")));
        assert_eq!(merged.get("only_a"), Some(&json!(1)));
        assert_eq!(merged.get("only_b"), Some(&json!(2)));
    }

    #[test]
    fn keep_old_preserves_base() {
        let a = Metadata::new().with("k", json!("old"));
        let b = Metadata::new().with("k", json!("new"));
        let merged = merge(&a, &b, MergeStrategy::KeepOld);
        assert_eq!(merged.get("k"), Some(&json!("old")));
    }
}
