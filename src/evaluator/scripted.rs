//! Table-driven evaluator.
//!
//! Outcomes are scripted per label class, so relation-equivalent tasks get
//! identical answers by construction. Anything not scripted is UNKNOWN.
//! Every predicate call is counted, which is what tests of the cache use.

use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;

use super::BasicPredicates;
use crate::logic::{Relation, Tvl};
use crate::model::{LabelClass, NetId, NetSystem, Task};
use crate::{Error, Result};

#[derive(Debug, Default)]
pub struct ScriptedPredicates {
    unary: HashMap<(Relation, LabelClass), Tvl>,
    binary: HashMap<(Relation, LabelClass, LabelClass), Tvl>,
    failing: HashSet<Relation>,
    fail_configure: bool,
    configured: Option<NetId>,
    calls: Mutex<HashMap<Relation, usize>>,
}

impl ScriptedPredicates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unary<I, S>(mut self, relation: Relation, class: I, value: Tvl) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unary.insert((relation, LabelClass::new(class)), value);
        self
    }

    pub fn with_binary<I, J, S>(mut self, relation: Relation, a: I, b: J, value: Tvl) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.binary
            .insert((relation, LabelClass::new(a), LabelClass::new(b)), value);
        self
    }

    /// Script the same value for both argument orders.
    pub fn with_symmetric<I, J, S>(self, relation: Relation, a: I, b: J, value: Tvl) -> Self
    where
        I: IntoIterator<Item = S> + Clone,
        J: IntoIterator<Item = S> + Clone,
        S: Into<String>,
    {
        self.with_binary(relation, a.clone(), b.clone(), value)
            .with_binary(relation, b, a, value)
    }

    /// Every call of `relation` fails.
    pub fn failing_on(mut self, relation: Relation) -> Self {
        self.failing.insert(relation);
        self
    }

    /// `configure` fails.
    pub fn failing_configure(mut self) -> Self {
        self.fail_configure = true;
        self
    }

    /// Net the evaluator is bound to.
    pub fn configured_net(&self) -> Option<NetId> {
        self.configured
    }

    pub fn calls(&self, relation: Relation) -> usize {
        self.calls.lock().get(&relation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    fn enter(&self, relation: Relation) -> Result<()> {
        *self.calls.lock().entry(relation).or_default() += 1;
        if self.configured.is_none() {
            return Err(Error::Evaluator("evaluator used before configure".into()));
        }
        if self.failing.contains(&relation) {
            return Err(Error::Evaluator(format!("scripted failure for {relation}")));
        }
        Ok(())
    }

    fn eval_unary(&self, relation: Relation, task: &Task) -> Result<Tvl> {
        self.enter(relation)?;
        Ok(self
            .unary
            .get(&(relation, task.similar_labels().clone()))
            .copied()
            .unwrap_or(Tvl::Unknown))
    }

    fn eval_binary(&self, relation: Relation, a: &Task, b: &Task) -> Result<Tvl> {
        self.enter(relation)?;
        let key = (relation, a.similar_labels().clone(), b.similar_labels().clone());
        Ok(self.binary.get(&key).copied().unwrap_or(Tvl::Unknown))
    }
}

impl BasicPredicates for ScriptedPredicates {
    fn configure(&mut self, net: &NetSystem) -> Result<()> {
        if self.fail_configure {
            return Err(Error::Evaluator(format!("cannot configure for net {}", net.id)));
        }
        self.configured = Some(net.id);
        Ok(())
    }

    fn can_occur(&self, task: &Task) -> Result<Tvl> {
        self.eval_unary(Relation::CanOccur, task)
    }

    fn always_occurs(&self, task: &Task) -> Result<Tvl> {
        self.eval_unary(Relation::AlwaysOccurs, task)
    }

    fn can_conflict(&self, a: &Task, b: &Task) -> Result<Tvl> {
        self.eval_binary(Relation::CanConflict, a, b)
    }

    fn can_cooccur(&self, a: &Task, b: &Task) -> Result<Tvl> {
        self.eval_binary(Relation::CanCooccur, a, b)
    }

    fn total_causal(&self, a: &Task, b: &Task) -> Result<Tvl> {
        self.eval_binary(Relation::TotalCausal, a, b)
    }

    fn total_concur(&self, a: &Task, b: &Task) -> Result<Tvl> {
        self.eval_binary(Relation::TotalConcur, a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskId;

    #[test]
    fn test_unconfigured_calls_fail() {
        let ev = ScriptedPredicates::new().with_unary(Relation::CanOccur, ["a"], Tvl::True);
        let t = Task::new("a", 1.0, TaskId(1), Vec::new());
        assert!(ev.can_occur(&t).is_err());
        assert_eq!(ev.calls(Relation::CanOccur), 1);
    }

    #[test]
    fn test_lookup_by_class() {
        let mut ev = ScriptedPredicates::new().with_unary(Relation::CanOccur, ["a", "b"], Tvl::False);
        ev.configure(&NetSystem::new(NetId(2), "n")).unwrap();

        let t = Task::new("b", 0.5, TaskId(7), vec!["a".to_string()]);
        assert_eq!(ev.can_occur(&t).unwrap(), Tvl::False);
        assert_eq!(ev.always_occurs(&t).unwrap(), Tvl::Unknown);
        assert_eq!(ev.configured_net(), Some(NetId(2)));
        assert_eq!(ev.total_calls(), 2);
    }

    #[test]
    fn test_symmetric_classes_of_different_size() {
        let mut ev = ScriptedPredicates::new().with_symmetric(
            Relation::CanCooccur,
            ["pay", "pay invoice"],
            ["ship"],
            Tvl::False,
        );
        ev.configure(&NetSystem::new(NetId(1), "n")).unwrap();

        let pay = Task::new("pay", 0.5, TaskId(1), vec!["pay invoice".to_string()]);
        let ship = Task::new("ship", 0.5, TaskId(2), Vec::new());
        assert_eq!(ev.can_cooccur(&pay, &ship).unwrap(), Tvl::False);
        assert_eq!(ev.can_cooccur(&ship, &pay).unwrap(), Tvl::False);
    }
}
