#![deny(missing_docs)]
//! `ThreadContext` — the mutable-feeling carrier threaded through every
//! handler in a threadflow composition.
//!
//! A stable UUID, a cancellation token, an ordered message list, and an
//! opaque metadata bag. `clone()` yields a structurally independent copy,
//! used by `First`/`Must` to give every parallel branch its own isolated
//! context before fan-out.

use threadflow_types::{Message, Metadata};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// The request-scoped carrier threaded through every handler.
///
/// `clone()` is the isolation boundary for parallel composition: the
/// clone's messages and metadata are independent `Vec`/`Metadata` values,
/// so mutations on one side are never observable on the other. The
/// cancellation token, by contrast, is reference-counted and *is* meant
/// to be shared — `First`/`Must` explicitly derive a *child* token (via
/// [`ThreadContext::with_context`]) when they want a branch to be
/// independently cancellable.
#[derive(Debug, Clone)]
pub struct ThreadContext {
    id: Uuid,
    cancellation: CancellationToken,
    messages: Vec<Message>,
    metadata: Metadata,
}

impl ThreadContext {
    /// Construct a fresh context bound to `cancellation`, with no messages
    /// and no metadata. A new UUID is assigned.
    pub fn new(cancellation: CancellationToken) -> Self {
        Self {
            id: Uuid::new_v4(),
            cancellation,
            messages: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// The stable UUID assigned at construction. Preserved by `clone()`
    /// and every `with_*` constructor.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The cancellation token propagated from the caller.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Whether the cancellation token has been tripped.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// The ordered message sequence.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The metadata bag.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// A mutable view of the metadata bag, for composables that need to
    /// set reserved keys on a context they already own (not a shared
    /// clone — see the type-level docs).
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Return a context identical to `self` but with `msgs` appended to
    /// the existing message list. Pre-existing fields are preserved.
    #[must_use]
    pub fn with_messages(&self, msgs: impl IntoIterator<Item = Message>) -> Self {
        let mut messages = self.messages.clone();
        messages.extend(msgs);
        Self {
            id: self.id,
            cancellation: self.cancellation.clone(),
            messages,
            metadata: self.metadata.clone(),
        }
    }

    /// Return a context identical to `self` but whose message list has
    /// been replaced wholesale by `msgs`, rather than appended to (see
    /// [`ThreadContext::with_messages`] for the append form). Used by the
    /// summarizer derived handler to swap the thread's running summary
    /// back in as a single system message rather than accumulating one
    /// per turn.
    #[must_use]
    pub fn with_messages_replaced(&self, msgs: impl IntoIterator<Item = Message>) -> Self {
        Self {
            id: self.id,
            cancellation: self.cancellation.clone(),
            messages: msgs.into_iter().collect(),
            metadata: self.metadata.clone(),
        }
    }

    /// Return a context identical to `self` but whose metadata has been
    /// merged with `meta` (`meta`'s keys win on collision). Pre-existing
    /// fields are preserved.
    #[must_use]
    pub fn with_metadata(&self, meta: &Metadata) -> Self {
        let metadata = threadflow_types::merge(&self.metadata, meta, threadflow_types::MergeStrategy::KeepNew);
        Self {
            id: self.id,
            cancellation: self.cancellation.clone(),
            messages: self.messages.clone(),
            metadata,
        }
    }

    /// Return a context identical to `self` but bound to a new
    /// cancellation token. Used by `First`/`Must` to give a branch a
    /// child token derived from the parent.
    #[must_use]
    pub fn with_context(&self, cancellation: CancellationToken) -> Self {
        Self {
            id: self.id,
            cancellation,
            messages: self.messages.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Append messages to *this* context's own state (not a clone).
    /// Equivalent to `*self = self.with_messages(msgs)`.
    pub fn append_messages(&mut self, msgs: impl IntoIterator<Item = Message>) {
        self.messages.extend(msgs);
    }

    /// Set a metadata key on *this* context's own state (not a clone).
    pub fn set_key_value(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.metadata.set(key, value);
    }

    /// A structurally independent copy. Modifications to the clone's
    /// messages or metadata are never observable through the original —
    /// this is the isolation `First`/`Must` rely on before fan-out.
    ///
    /// The cancellation token is shared (reference-counted) by default;
    /// call [`ThreadContext::with_context`] afterward to bind a derived
    /// child token for independent cancellation.
    #[must_use]
    pub fn isolated_clone(&self) -> Self {
        self.clone()
    }

    /// Serialize the current message list to a compact JSON string, used
    /// internally by the freeform/structured extractors and the
    /// summarizer when building a prompt.
    pub fn messages_json(&self) -> String {
        serde_json::to_string(&self.messages).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use threadflow_types::Role;

    #[test]
    fn id_preserved_across_constructors() {
        let tc = ThreadContext::new(CancellationToken::new());
        let id = tc.id();
        let tc2 = tc.with_messages([Message::new(Role::User, "hi")]);
        assert_eq!(tc2.id(), id);
        let tc3 = tc2.with_metadata(&Metadata::new().with("k", json!(1)));
        assert_eq!(tc3.id(), id);
        let tc4 = tc3.with_context(CancellationToken::new());
        assert_eq!(tc4.id(), id);
    }

    #[test]
    fn clone_is_isolated() {
        let mut tc = ThreadContext::new(CancellationToken::new());
        tc.append_messages([Message::new(Role::User, "base")]);
        let mut clone = tc.isolated_clone();
        clone.append_messages([Message::new(Role::User, "only on clone")]);
        clone.set_key_value("k", json!("only on clone"));

        assert_eq!(tc.messages().len(), 1);
        assert_eq!(clone.messages().len(), 2);
        assert!(tc.metadata().get("k").is_none());
        assert!(clone.metadata().get("k").is_some());
    }

    #[test]
    fn with_messages_preserves_existing() {
        let tc = ThreadContext::new(CancellationToken::new())
            .with_messages([Message::new(Role::User, "a")]);
        let tc2 = tc.with_messages([Message::new(Role::User, "b")]);
        assert_eq!(tc2.messages().len(), 2);
        assert_eq!(tc2.messages()[0].content, "a");
        assert_eq!(tc2.messages()[1].content, "b");
    }

    #[test]
    fn with_messages_replaced_swaps_whole_list() {
        let tc = ThreadContext::new(CancellationToken::new())
            .with_messages([Message::new(Role::User, "a"), Message::new(Role::User, "b")]);
        let replaced = tc.with_messages_replaced([Message::new(Role::System, "fresh")]);
        assert_eq!(replaced.messages().len(), 1);
        assert_eq!(replaced.messages()[0].content, "fresh");
        assert_eq!(replaced.id(), tc.id());
    }

    #[test]
    fn cancellation_propagates_via_child_token() {
        let parent = CancellationToken::new();
        let tc = ThreadContext::new(parent.clone());
        let child = parent.child_token();
        let branch = tc.with_context(child.clone());
        assert!(!branch.is_cancelled());
        parent.cancel();
        assert!(branch.is_cancelled());
    }
}
