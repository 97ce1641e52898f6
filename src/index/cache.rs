//! Equivalence-class cache.
//!
//! Relation outcomes depend only on a task's label class, so the builder
//! interns every class once and caches evaluator answers by class id.
//! Everything here lives for exactly one build.

use hashbrown::HashMap;

use crate::logic::{Relation, Tvl};
use crate::model::LabelClass;

/// Dense id of an interned label class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

/// Interns label classes to small integer ids.
#[derive(Debug, Default)]
pub struct ClassArena {
    ids: HashMap<LabelClass, ClassId>,
}

impl ClassArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, class: &LabelClass) -> ClassId {
        if let Some(id) = self.ids.get(class) {
            return *id;
        }
        let id = ClassId(self.ids.len() as u32);
        self.ids.insert(class.clone(), id);
        id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Unary outcomes keyed by (relation, class).
#[derive(Debug, Default)]
pub struct UnaryCache {
    values: HashMap<(Relation, ClassId), Tvl>,
}

impl UnaryCache {
    pub fn get(&self, relation: Relation, class: ClassId) -> Option<Tvl> {
        self.values.get(&(relation, class)).copied()
    }

    /// Cached value, or `eval()` stored and returned. The flag is true on a hit.
    pub fn get_or_insert_with(
        &mut self,
        relation: Relation,
        class: ClassId,
        eval: impl FnOnce() -> Tvl,
    ) -> (Tvl, bool) {
        if let Some(v) = self.get(relation, class) {
            return (v, true);
        }
        let v = eval();
        self.values.insert((relation, class), v);
        (v, false)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Outcomes of symmetric relations keyed by an unordered class pair.
///
/// One entry serves both argument orders.
#[derive(Debug, Default)]
pub struct SymmetricCache {
    values: HashMap<(Relation, ClassId, ClassId), Tvl>,
}

impl SymmetricCache {
    fn key(relation: Relation, a: ClassId, b: ClassId) -> (Relation, ClassId, ClassId) {
        debug_assert!(relation.is_symmetric(), "{relation} is not cached symmetrically");
        if a <= b { (relation, a, b) } else { (relation, b, a) }
    }

    pub fn get(&self, relation: Relation, a: ClassId, b: ClassId) -> Option<Tvl> {
        self.values.get(&Self::key(relation, a, b)).copied()
    }

    /// Cached value for {a, b}, or `eval()` stored and returned. The flag is true on a hit.
    pub fn get_or_insert_with(
        &mut self,
        relation: Relation,
        a: ClassId,
        b: ClassId,
        eval: impl FnOnce() -> Tvl,
    ) -> (Tvl, bool) {
        let key = Self::key(relation, a, b);
        if let Some(v) = self.values.get(&key) {
            return (*v, true);
        }
        let v = eval();
        self.values.insert(key, v);
        (v, false)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
