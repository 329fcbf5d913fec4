use listenlint_common::Span;
use rustc_hash::FxHashMap;

use super::resolver::IdentityKey;

/// A registration still waiting for its `removeEventListener`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    pub key: IdentityKey,
    /// Span of the `addEventListener` call.
    pub span: Span,
    /// Earlier registrations of the same key that this one replaced, oldest
    /// first.
    pub replaced: Vec<Span>,
}

/// Pending registrations of one analysis unit, keyed by identity.
///
/// Iteration follows the order in which keys were first registered.
/// Re-registering a pending key replaces its call site in place; a key that
/// was removed and registered again goes to the end.
#[derive(Debug, Default)]
pub struct Ledger {
    slots: Vec<Option<PendingRegistration>>,
    index: FxHashMap<IdentityKey, usize>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a registration. Returns the entry it replaced, if any.
    pub fn insert(&mut self, key: IdentityKey, span: Span) -> Option<PendingRegistration> {
        if let Some(&slot) = self.index.get(&key) {
            tracing::trace!(%key, "replacing pending registration");
            let previous = self.slots[slot].take();
            let replaced = previous
                .iter()
                .flat_map(|p| p.replaced.iter().chain([&p.span]))
                .cloned()
                .collect();
            self.slots[slot] = Some(PendingRegistration {
                key,
                span,
                replaced,
            });
            return previous;
        }
        tracing::trace!(%key, "pending registration");
        self.index.insert(key.clone(), self.slots.len());
        self.slots.push(Some(PendingRegistration {
            key,
            span,
            replaced: Vec::new(),
        }));
        None
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.index.contains_key(key)
    }

    /// Remove and return the pending registration for `key`.
    pub fn remove(&mut self, key: &IdentityKey) -> Option<PendingRegistration> {
        let slot = self.index.remove(key)?;
        tracing::trace!(%key, "registration removed");
        self.slots[slot].take()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Take every pending registration, oldest key first. The ledger is
    /// empty afterwards.
    pub fn drain_pending(&mut self) -> Vec<PendingRegistration> {
        self.index.clear();
        self.slots.drain(..).flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listenlint_common::Position;

    fn key(handler: &str) -> IdentityKey {
        IdentityKey::new("document", "click", handler)
    }

    fn span_at(line: u32) -> Span {
        Span::new("test.js", Position::new(line, 1, 0), Position::new(line, 10, 9))
    }

    fn handlers(pending: &[PendingRegistration]) -> Vec<&str> {
        pending.iter().map(|p| p.key.handler.as_str()).collect()
    }

    #[test]
    fn insert_then_remove() {
        let mut ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.insert(key("a"), span_at(1)), None);
        assert!(ledger.contains(&key("a")));
        assert_eq!(ledger.len(), 1);

        let removed = ledger.remove(&key("a")).expect("pending entry");
        assert_eq!(removed.span, span_at(1));
        assert!(ledger.is_empty());
        assert_eq!(ledger.remove(&key("a")), None);
        assert!(ledger.drain_pending().is_empty());
    }

    #[test]
    fn overwrite_keeps_first_position() {
        let mut ledger = Ledger::new();
        ledger.insert(key("a"), span_at(1));
        ledger.insert(key("b"), span_at(2));
        let displaced = ledger.insert(key("a"), span_at(3));
        assert_eq!(displaced.map(|p| p.span), Some(span_at(1)));
        assert_eq!(ledger.len(), 2);

        let pending = ledger.drain_pending();
        assert_eq!(handlers(&pending), vec!["a", "b"]);
        assert_eq!(pending[0].span, span_at(3));
        assert_eq!(pending[0].replaced, vec![span_at(1)]);
        assert!(pending[1].replaced.is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn replaced_spans_accumulate_until_removal() {
        let mut ledger = Ledger::new();
        ledger.insert(key("a"), span_at(1));
        ledger.insert(key("a"), span_at(2));
        let displaced = ledger.insert(key("a"), span_at(3));
        assert_eq!(displaced.map(|p| p.replaced), Some(vec![span_at(1)]));

        let removed = ledger.remove(&key("a")).expect("pending entry");
        assert_eq!(removed.replaced, vec![span_at(1), span_at(2)]);

        ledger.insert(key("a"), span_at(4));
        assert!(ledger.drain_pending()[0].replaced.is_empty());
    }

    #[test]
    fn re_registration_after_removal_moves_to_end() {
        let mut ledger = Ledger::new();
        ledger.insert(key("a"), span_at(1));
        ledger.insert(key("b"), span_at(2));
        ledger.remove(&key("a"));
        ledger.insert(key("a"), span_at(3));

        let pending = ledger.drain_pending();
        assert_eq!(handlers(&pending), vec!["b", "a"]);
    }

    #[test]
    fn keys_differ_by_any_part() {
        let mut ledger = Ledger::new();
        ledger.insert(IdentityKey::new("document", "click", "f"), span_at(1));
        assert!(!ledger.contains(&IdentityKey::new("window", "click", "f")));
        assert!(!ledger.contains(&IdentityKey::new("document", "keyup", "f")));
        assert!(!ledger.contains(&IdentityKey::new("document", "click", "g")));
        // No ambiguity from separators inside names
        ledger.insert(IdentityKey::new("a_b", "c", "d"), span_at(2));
        assert!(!ledger.contains(&IdentityKey::new("a", "b_c", "d")));
    }
}
