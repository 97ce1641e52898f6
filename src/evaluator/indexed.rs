//! Query-time evaluator backed by a finished index.
//!
//! Reads the outcomes a build persisted. A stored row is a definite answer;
//! no row (or a task that was never resolved) is UNKNOWN. Composite
//! relations come for free through `CompositeRelations`.

use super::BasicPredicates;
use crate::logic::{Relation, Tvl};
use crate::model::{NetId, NetSystem, Task};
use crate::storage::IndexStore;
use crate::{Error, Result};

pub struct IndexedPredicates<'s, S: IndexStore + ?Sized> {
    store: &'s S,
    net: Option<NetId>,
}

impl<'s, S: IndexStore + ?Sized> IndexedPredicates<'s, S> {
    /// Unbound evaluator; call `configure` before use.
    pub fn new(store: &'s S) -> Self {
        Self { store, net: None }
    }

    /// Evaluator already bound to `net`.
    pub fn for_net(store: &'s S, net: NetId) -> Self {
        Self { store, net: Some(net) }
    }

    fn net(&self) -> Result<NetId> {
        self.net
            .ok_or_else(|| Error::Evaluator("indexed predicates used before configure".into()))
    }

    fn lookup_unary(&self, relation: Relation, task: &Task) -> Result<Tvl> {
        let net = self.net()?;
        if !task.id().is_resolved() {
            return Ok(Tvl::Unknown);
        }
        Ok(self.store.read_unary_outcome(net, task.id(), relation)?.into())
    }

    fn lookup_binary(&self, relation: Relation, a: &Task, b: &Task) -> Result<Tvl> {
        let net = self.net()?;
        if !a.id().is_resolved() || !b.id().is_resolved() {
            return Ok(Tvl::Unknown);
        }
        Ok(self.store.read_binary_outcome(net, a.id(), b.id(), relation)?.into())
    }
}

impl<S: IndexStore + ?Sized> BasicPredicates for IndexedPredicates<'_, S> {
    fn configure(&mut self, net: &NetSystem) -> Result<()> {
        self.net = Some(net.id);
        Ok(())
    }

    fn can_occur(&self, task: &Task) -> Result<Tvl> {
        self.lookup_unary(Relation::CanOccur, task)
    }

    fn always_occurs(&self, task: &Task) -> Result<Tvl> {
        self.lookup_unary(Relation::AlwaysOccurs, task)
    }

    fn can_conflict(&self, a: &Task, b: &Task) -> Result<Tvl> {
        self.lookup_binary(Relation::CanConflict, a, b)
    }

    fn can_cooccur(&self, a: &Task, b: &Task) -> Result<Tvl> {
        self.lookup_binary(Relation::CanCooccur, a, b)
    }

    fn total_causal(&self, a: &Task, b: &Task) -> Result<Tvl> {
        self.lookup_binary(Relation::TotalCausal, a, b)
    }

    fn total_concur(&self, a: &Task, b: &Task) -> Result<Tvl> {
        self.lookup_binary(Relation::TotalConcur, a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::CompositeRelations;
    use crate::model::TaskId;
    use crate::storage::MemoryIndexStore;

    const N: NetId = NetId(5);

    fn task(label: &str, id: i64) -> Task {
        Task::new(label, 1.0, TaskId(id), Vec::new())
    }

    #[test]
    fn test_missing_row_is_unknown() {
        let store = MemoryIndexStore::new();
        store.write_unary_outcome(N, TaskId(1), Relation::CanOccur, false).unwrap();

        let ev = IndexedPredicates::for_net(&store, N);
        assert_eq!(ev.can_occur(&task("a", 1)).unwrap(), Tvl::False);
        assert_eq!(ev.always_occurs(&task("a", 1)).unwrap(), Tvl::Unknown);
        assert_eq!(ev.can_occur(&task("z", 0)).unwrap(), Tvl::Unknown);
    }

    #[test]
    fn test_unconfigured_is_error() {
        let store = MemoryIndexStore::new();
        let ev = IndexedPredicates::new(&store);
        assert!(ev.can_occur(&task("a", 1)).is_err());
    }

    #[test]
    fn test_composites_from_stored_primitives() {
        let store = MemoryIndexStore::new();
        let (a, b) = (task("a", 1), task("b", 2));
        store.write_binary_outcome(N, TaskId(1), TaskId(2), Relation::CanConflict, true).unwrap();
        store.write_binary_outcome(N, TaskId(2), TaskId(1), Relation::CanConflict, true).unwrap();
        store.write_binary_outcome(N, TaskId(1), TaskId(2), Relation::CanCooccur, false).unwrap();

        let mut ev = IndexedPredicates::new(&store);
        ev.configure(&NetSystem::new(N, "n5")).unwrap();
        assert_eq!(ev.conflict(&a, &b), Tvl::True);
        assert_eq!(ev.cooccur(&a, &b), Tvl::False);
        // b/a co-occurrence was never stored
        assert_eq!(ev.conflict(&b, &a), Tvl::Unknown);
    }
}
