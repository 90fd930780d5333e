//! The active connection set.
//!
//! An ordered collection of `(ConnectionId, C)` entries. Only the event
//! loop owns a `Registry`; every mutation goes through it, so the type
//! itself carries no locking.
//!
//! Broadcast failures are removed with [`Registry::compact`] after the
//! write pass has finished walking the entries. The set is never shrunk
//! while it is being iterated.

use std::collections::HashSet;

use crate::domain::foundation::ConnectionId;

/// Ordered set of active connections keyed by [`ConnectionId`].
#[derive(Debug)]
pub struct Registry<C> {
    entries: Vec<(ConnectionId, C)>,
}

impl<C> Registry<C> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a connection to the active set.
    ///
    /// Returns `false` without modifying the set if the ID is already
    /// present.
    pub fn admit(&mut self, id: ConnectionId, connection: C) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.entries.push((id, connection));
        true
    }

    /// Removes a connection if present. Absent IDs are a no-op.
    pub fn evict(&mut self, id: &ConnectionId) -> Option<C> {
        let index = self.entries.iter().position(|(entry_id, _)| entry_id == id)?;
        Some(self.entries.remove(index).1)
    }

    /// Removes every listed connection in a single pass, preserving the
    /// order of the survivors. Returns the removed entries in their
    /// original order. Unknown IDs are ignored.
    pub fn compact(&mut self, failed: &[ConnectionId]) -> Vec<(ConnectionId, C)> {
        if failed.is_empty() {
            return Vec::new();
        }
        let failed: HashSet<&ConnectionId> = failed.iter().collect();
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|(id, _)| failed.contains(id));
        self.entries = kept;
        removed
    }

    /// Empties the set, returning every entry.
    pub fn drain(&mut self) -> Vec<(ConnectionId, C)> {
        std::mem::take(&mut self.entries)
    }

    /// Returns true if the ID is in the active set.
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.entries.iter().any(|(entry_id, _)| entry_id == id)
    }

    /// Iterates the active set in admission order.
    pub fn iter(&self) -> impl Iterator<Item = (&ConnectionId, &C)> {
        self.entries.iter().map(|(id, connection)| (id, connection))
    }

    /// IDs of the active set in admission order.
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(n: usize) -> Vec<ConnectionId> {
        (0..n).map(|_| ConnectionId::new()).collect()
    }

    #[test]
    fn admit_appends_in_order() {
        let mut registry = Registry::new();
        let ids = ids(3);
        for (i, id) in ids.iter().enumerate() {
            assert!(registry.admit(*id, i));
        }
        assert_eq!(registry.ids(), ids);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn admit_rejects_duplicate_id() {
        let mut registry = Registry::new();
        let id = ConnectionId::new();
        assert!(registry.admit(id, "first"));
        assert!(!registry.admit(id, "second"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.iter().next().map(|(_, c)| *c), Some("first"));
    }

    #[test]
    fn evict_absent_id_is_noop() {
        let mut registry = Registry::new();
        let present = ConnectionId::new();
        registry.admit(present, ());

        assert!(registry.evict(&ConnectionId::new()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn evict_twice_removes_once() {
        let mut registry = Registry::new();
        let id = ConnectionId::new();
        registry.admit(id, 7);

        assert_eq!(registry.evict(&id), Some(7));
        assert_eq!(registry.evict(&id), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn compact_removes_failed_and_keeps_order() {
        let mut registry = Registry::new();
        let ids = ids(5);
        for (i, id) in ids.iter().enumerate() {
            registry.admit(*id, i);
        }

        let removed = registry.compact(&[ids[3], ids[1]]);

        assert_eq!(
            removed.iter().map(|(_, c)| *c).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(registry.ids(), vec![ids[0], ids[2], ids[4]]);
    }

    #[test]
    fn compact_with_no_failures_leaves_set_untouched() {
        let mut registry = Registry::new();
        let id = ConnectionId::new();
        registry.admit(id, ());
        assert!(registry.compact(&[]).is_empty());
        assert!(registry.contains(&id));
    }

    #[test]
    fn drain_empties_registry() {
        let mut registry = Registry::new();
        for id in ids(4) {
            registry.admit(id, ());
        }
        assert_eq!(registry.drain().len(), 4);
        assert!(registry.is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Admit,
        Readmit(usize),
        Evict(usize),
        Compact(Vec<usize>),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Admit),
            (0usize..16).prop_map(Op::Readmit),
            (0usize..16).prop_map(Op::Evict),
            proptest::collection::vec(0usize..16, 0..4).prop_map(Op::Compact),
        ]
    }

    proptest! {
        #[test]
        fn ids_stay_unique_and_evicted_ids_stay_out(ops in proptest::collection::vec(op(), 0..64)) {
            let mut registry = Registry::new();
            let mut seen: Vec<ConnectionId> = Vec::new();
            let mut evicted: HashSet<ConnectionId> = HashSet::new();

            for op in ops {
                match op {
                    Op::Admit => {
                        let id = ConnectionId::new();
                        prop_assert!(registry.admit(id, ()));
                        seen.push(id);
                    }
                    Op::Readmit(i) => {
                        if let Some(id) = seen.get(i) {
                            let was_present = registry.contains(id);
                            let admitted = !evicted.contains(id) && registry.admit(*id, ());
                            prop_assert!(!(was_present && admitted));
                        }
                    }
                    Op::Evict(i) => {
                        if let Some(id) = seen.get(i) {
                            registry.evict(id);
                            evicted.insert(*id);
                        }
                    }
                    Op::Compact(indices) => {
                        let failed: Vec<ConnectionId> =
                            indices.iter().filter_map(|i| seen.get(*i).copied()).collect();
                        registry.compact(&failed);
                        evicted.extend(failed);
                    }
                }

                let ids = registry.ids();
                let unique: HashSet<_> = ids.iter().collect();
                prop_assert_eq!(unique.len(), ids.len());
                for id in &ids {
                    prop_assert!(!evicted.contains(id));
                }
            }
        }
    }
}
