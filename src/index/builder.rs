//! Relation index builder.
//!
//! One full indexing pass for one net:
//!
//! ```text
//! status == INDEXING? → restore net + natural marking → register labels
//!   → task universe (label × threshold) → configure evaluator
//!   → unary pass → symmetric pass → asymmetric pass → INDEXED
//! ```
//!
//! Outcomes are written as soon as they are known. A failure aborts the
//! pass without rolling back rows already written and without touching
//! the status; whoever claimed the net decides what happens next.

use std::collections::BTreeSet;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::cache::{ClassArena, ClassId, SymmetricCache, UnaryCache};
use crate::evaluator::{BasicPredicates, degrade};
use crate::label::LabelManager;
use crate::logic::{Relation, Tvl};
use crate::model::{IndexStatus, NetId, Task};
use crate::persist::NetRepository;
use crate::storage::IndexStore;
use crate::{Error, Result};

/// Counters for one finished build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub tasks: usize,
    /// Distinct label classes among the tasks.
    pub classes: usize,
    pub evaluator_calls: usize,
    pub cache_hits: usize,
    /// Predicate calls that failed and were recorded as UNKNOWN.
    pub degraded: usize,
    pub written: usize,
    pub suppressed_unknown: usize,
    pub skipped_unresolved: usize,
    pub elapsed_ms: u64,
}

/// Builds the behavioral relation index of one net.
///
/// All collaborators are borrowed for the builder's lifetime; the evaluator
/// mutably, since it is bound to the net being built.
pub struct RelationIndexBuilder<'a, R: ?Sized, L: ?Sized, E: ?Sized, S: ?Sized> {
    nets: &'a R,
    labels: &'a L,
    evaluator: &'a mut E,
    store: &'a S,
}

impl<'a, R, L, E, S> RelationIndexBuilder<'a, R, L, E, S>
where
    R: NetRepository + ?Sized,
    L: LabelManager + ?Sized,
    E: BasicPredicates + ?Sized,
    S: IndexStore + ?Sized,
{
    pub fn new(nets: &'a R, labels: &'a L, evaluator: &'a mut E, store: &'a S) -> Self {
        Self { nets, labels, evaluator, store }
    }

    /// Index `net`. Returns false if the net is not claimed for indexing
    /// or the pass failed.
    pub fn build(&mut self, net: NetId) -> bool {
        match self.try_build(net) {
            Ok(_) => true,
            Err(e) => {
                warn!(%net, error = %e, "Index build failed");
                false
            }
        }
    }

    /// Index `net`, reporting what happened.
    ///
    /// Fails with `Error::NotClaimed` before any other call if the net's
    /// status is not INDEXING.
    #[instrument(skip(self))]
    pub fn try_build(&mut self, net: NetId) -> Result<BuildReport> {
        let status = self.store.get_status(net)?;
        if status != IndexStatus::Indexing {
            return Err(Error::NotClaimed { net, status });
        }
        let started = Instant::now();

        let mut sys = self.nets.restore_net_system(net)?;
        sys.load_natural_marking();

        for t in sys.observable_transitions() {
            if let Some(label) = &t.label {
                self.labels.index_label(label)?;
            }
        }
        for t in sys.observable_transitions() {
            if let Some(label) = &t.label {
                self.labels.index_task(label)?;
            }
        }

        let labels: BTreeSet<&str> = sys
            .observable_transitions()
            .filter_map(|t| t.label.as_deref())
            .map(str::trim)
            .collect();
        let mut similarities = self.labels.indexed_similarities()?;
        similarities.sort_by(|a, b| b.total_cmp(a));
        similarities.dedup_by(|a, b| a.total_cmp(b).is_eq());

        let mut arena = ClassArena::new();
        let mut universe: Vec<(Task, ClassId)> = Vec::with_capacity(labels.len() * similarities.len());
        for label in &labels {
            for sim in &similarities {
                let task = self.labels.load_task(label, *sim, &similarities)?;
                let class = arena.intern(task.similar_labels());
                universe.push((task, class));
            }
        }

        self.evaluator.configure(&sys)?;

        let mut report = BuildReport {
            tasks: universe.len(),
            classes: arena.len(),
            ..Default::default()
        };
        debug!(tasks = report.tasks, classes = report.classes, "Task universe built");

        self.unary_pass(net, &universe, &mut report)?;
        self.symmetric_pass(net, &universe, &mut report)?;
        self.asymmetric_pass(net, &universe, &mut report)?;

        self.store.set_status(net, IndexStatus::Indexed)?;
        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            written = report.written,
            evaluator_calls = report.evaluator_calls,
            cache_hits = report.cache_hits,
            elapsed_ms = report.elapsed_ms,
            "Net indexed"
        );
        Ok(report)
    }

    // ========================================================================
    // Passes
    // ========================================================================

    fn unary_pass(&self, net: NetId, universe: &[(Task, ClassId)], report: &mut BuildReport) -> Result<()> {
        let mut cache = UnaryCache::default();
        for (task, class) in universe {
            for relation in Relation::UNARY {
                let (value, hit) = cache.get_or_insert_with(relation, *class, || {
                    self.evaluate(report, relation, || self.evaluator.unary(relation, task))
                });
                if hit {
                    report.cache_hits += 1;
                }
                self.emit_unary(net, task, relation, value, report)?;
            }
        }
        debug!(classes_evaluated = cache.len(), "Unary pass done");
        Ok(())
    }

    fn symmetric_pass(&self, net: NetId, universe: &[(Task, ClassId)], report: &mut BuildReport) -> Result<()> {
        let mut cache = SymmetricCache::default();
        for (a, ca) in universe {
            for (b, cb) in universe {
                for relation in Relation::SYMMETRIC {
                    let (value, hit) = cache.get_or_insert_with(relation, *ca, *cb, || {
                        self.evaluate(report, relation, || self.evaluator.binary(relation, a, b))
                    });
                    if hit {
                        report.cache_hits += 1;
                    }
                    self.emit_binary(net, a, b, relation, value, report)?;
                }
            }
        }
        debug!(pairs_evaluated = cache.len(), "Symmetric pass done");
        Ok(())
    }

    /// Direction matters here, so nothing is cached.
    fn asymmetric_pass(&self, net: NetId, universe: &[(Task, ClassId)], report: &mut BuildReport) -> Result<()> {
        for (a, _) in universe {
            for (b, _) in universe {
                for relation in Relation::ASYMMETRIC {
                    let value = self.evaluate(report, relation, || self.evaluator.binary(relation, a, b));
                    self.emit_binary(net, a, b, relation, value, report)?;
                }
            }
        }
        debug!("Asymmetric pass done");
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn evaluate(&self, report: &mut BuildReport, relation: Relation, call: impl FnOnce() -> Result<Tvl>) -> Tvl {
        report.evaluator_calls += 1;
        let result = call();
        if result.is_err() {
            report.degraded += 1;
        }
        degrade(relation, result)
    }

    fn emit_unary(&self, net: NetId, task: &Task, relation: Relation, value: Tvl, report: &mut BuildReport) -> Result<()> {
        if !task.id().is_resolved() {
            report.skipped_unresolved += 1;
            return Ok(());
        }
        let Some(v) = value.to_bool() else {
            report.suppressed_unknown += 1;
            return Ok(());
        };
        self.store.write_unary_outcome(net, task.id(), relation, v)?;
        report.written += 1;
        Ok(())
    }

    fn emit_binary(
        &self,
        net: NetId,
        a: &Task,
        b: &Task,
        relation: Relation,
        value: Tvl,
        report: &mut BuildReport,
    ) -> Result<()> {
        if !a.id().is_resolved() || !b.id().is_resolved() {
            report.skipped_unresolved += 1;
            return Ok(());
        }
        let Some(v) = value.to_bool() else {
            report.suppressed_unknown += 1;
            return Ok(());
        };
        self.store.write_binary_outcome(net, a.id(), b.id(), relation, v)?;
        report.written += 1;
        Ok(())
    }
}
