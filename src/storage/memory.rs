//! In-memory index store.
//!
//! This is the reference implementation of `IndexStore`.
//! It uses hash maps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No durability**: everything is lost on drop.
//! - **Two locks**: status records and outcome rows are guarded separately.
//!   Status changes (`claim`, `next_job`, `set_status`) are atomic with
//!   respect to each other; `delete_index` and `cleanup` are not atomic
//!   with respect to concurrent outcome writes for the same net.
//!
//! Use this store for:
//! - Testing the indexing engine and scheduler
//! - Embedding the index in applications that don't need persistence

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::{IndexStore, OutcomeRecord};
use crate::logic::Relation;
use crate::model::{IndexStatus, IndexType, NetId, TaskId};
use crate::{Error, Result};

const DEFAULT_STALE_CLAIM_SECS: i64 = 3600;

// ============================================================================
// MemoryIndexStore
// ============================================================================

/// In-memory relation index.
#[derive(Clone)]
pub struct MemoryIndexStore {
    inner: Arc<MemoryInner>,
    stale_claim_timeout: Duration,
}

struct MemoryInner {
    status: RwLock<HashMap<NetId, StatusRecord>>,
    outcomes: RwLock<HashMap<NetId, NetOutcomes>>,
}

#[derive(Debug, Clone, Copy)]
struct StatusRecord {
    status: IndexStatus,
    index_type: IndexType,
    updated_at: DateTime<Utc>,
}

impl StatusRecord {
    fn new(index_type: IndexType, now: DateTime<Utc>) -> Self {
        Self { status: IndexStatus::Unindexed, index_type, updated_at: now }
    }
}

#[derive(Debug, Default)]
struct NetOutcomes {
    unary: HashMap<(TaskId, Relation), bool>,
    binary: HashMap<(TaskId, TaskId, Relation), bool>,
}

impl NetOutcomes {
    fn len(&self) -> usize {
        self.unary.len() + self.binary.len()
    }
}

impl Default for MemoryIndexStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIndexStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                status: RwLock::new(HashMap::new()),
                outcomes: RwLock::new(HashMap::new()),
            }),
            stale_claim_timeout: Duration::seconds(DEFAULT_STALE_CLAIM_SECS),
        }
    }

    /// Claims older than `timeout` are released by `cleanup`.
    pub fn with_stale_claim_timeout(mut self, timeout: Duration) -> Self {
        self.stale_claim_timeout = timeout;
        self
    }

    /// `cleanup` evaluated at an explicit point in time.
    pub fn cleanup_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut released = 0;
        {
            let mut status = self.inner.status.write();
            for (net, rec) in status.iter_mut() {
                if rec.status == IndexStatus::Indexing && now - rec.updated_at > self.stale_claim_timeout {
                    debug!(%net, claimed_at = %rec.updated_at, "Releasing stale claim");
                    rec.status = IndexStatus::Unindexed;
                    rec.updated_at = now;
                    released += 1;
                }
            }
        }

        // Rows are kept for nets that are indexed or still being built.
        let keep: Vec<NetId> = self
            .inner
            .status
            .read()
            .iter()
            .filter(|(_, rec)| matches!(rec.status, IndexStatus::Indexed | IndexStatus::Indexing))
            .map(|(net, _)| *net)
            .collect();
        let mut outcomes = self.inner.outcomes.write();
        let before: usize = outcomes.values().map(NetOutcomes::len).sum();
        outcomes.retain(|net, _| keep.contains(net));
        let after: usize = outcomes.values().map(NetOutcomes::len).sum();

        info!(released, rows_removed = before - after, "Index cleanup finished");
        Ok(released)
    }

    fn check_task(task: TaskId) -> Result<()> {
        if task.is_resolved() {
            Ok(())
        } else {
            Err(Error::Storage(format!("refusing to store unresolved task id {task}")))
        }
    }
}

// ============================================================================
// IndexStore impl
// ============================================================================

impl IndexStore for MemoryIndexStore {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    fn register_net(&self, net: NetId, index_type: IndexType) -> Result<()> {
        self.inner
            .status
            .write()
            .entry(net)
            .or_insert_with(|| StatusRecord::new(index_type, Utc::now()));
        Ok(())
    }

    fn get_status(&self, net: NetId) -> Result<IndexStatus> {
        Ok(self
            .inner
            .status
            .read()
            .get(&net)
            .map_or(IndexStatus::Unindexed, |rec| rec.status))
    }

    fn get_index_type(&self, net: NetId) -> Result<Option<IndexType>> {
        Ok(self.inner.status.read().get(&net).map(|rec| rec.index_type))
    }

    fn set_status(&self, net: NetId, next: IndexStatus) -> Result<()> {
        let now = Utc::now();
        let mut status = self.inner.status.write();
        let rec = status
            .entry(net)
            .or_insert_with(|| StatusRecord::new(IndexType::default(), now));

        if !rec.status.can_transition_to(next) {
            return Err(Error::InvalidTransition { net, from: rec.status, to: next });
        }
        if rec.status != next {
            debug!(%net, from = %rec.status, to = %next, "Index status changed");
            rec.status = next;
            rec.updated_at = now;
        }
        Ok(())
    }

    fn claim(&self, net: NetId) -> Result<bool> {
        let now = Utc::now();
        let mut status = self.inner.status.write();
        let rec = status
            .entry(net)
            .or_insert_with(|| StatusRecord::new(IndexType::default(), now));

        if rec.status != IndexStatus::Unindexed {
            return Ok(false);
        }
        rec.status = IndexStatus::Indexing;
        rec.updated_at = now;
        Ok(true)
    }

    fn next_job(&self) -> Result<Option<NetId>> {
        let now = Utc::now();
        let mut status = self.inner.status.write();
        let next = status
            .iter()
            .filter(|(_, rec)| rec.status == IndexStatus::Unindexed)
            .map(|(net, _)| *net)
            .min();

        if let Some(net) = next {
            if let Some(rec) = status.get_mut(&net) {
                rec.status = IndexStatus::Indexing;
                rec.updated_at = now;
            }
        }
        Ok(next)
    }

    fn delete_index(&self, net: NetId) -> Result<usize> {
        let removed = self.inner.outcomes.write().remove(&net).map_or(0, |o| o.len());
        if let Some(rec) = self.inner.status.write().get_mut(&net) {
            rec.status = IndexStatus::Unindexed;
            rec.updated_at = Utc::now();
        }
        info!(%net, removed, "Index deleted");
        Ok(removed)
    }

    fn cleanup(&self) -> Result<usize> {
        self.cleanup_at(Utc::now())
    }

    // ========================================================================
    // Outcomes
    // ========================================================================

    fn write_unary_outcome(&self, net: NetId, task: TaskId, relation: Relation, value: bool) -> Result<()> {
        Self::check_task(task)?;
        self.inner
            .outcomes
            .write()
            .entry(net)
            .or_default()
            .unary
            .insert((task, relation), value);
        Ok(())
    }

    fn write_binary_outcome(
        &self,
        net: NetId,
        task_a: TaskId,
        task_b: TaskId,
        relation: Relation,
        value: bool,
    ) -> Result<()> {
        Self::check_task(task_a)?;
        Self::check_task(task_b)?;
        self.inner
            .outcomes
            .write()
            .entry(net)
            .or_default()
            .binary
            .insert((task_a, task_b, relation), value);
        Ok(())
    }

    fn read_unary_outcome(&self, net: NetId, task: TaskId, relation: Relation) -> Result<Option<bool>> {
        Ok(self
            .inner
            .outcomes
            .read()
            .get(&net)
            .and_then(|o| o.unary.get(&(task, relation)).copied()))
    }

    fn read_binary_outcome(
        &self,
        net: NetId,
        task_a: TaskId,
        task_b: TaskId,
        relation: Relation,
    ) -> Result<Option<bool>> {
        Ok(self
            .inner
            .outcomes
            .read()
            .get(&net)
            .and_then(|o| o.binary.get(&(task_a, task_b, relation)).copied()))
    }

    fn outcomes(&self, net: NetId) -> Result<Vec<OutcomeRecord>> {
        let outcomes = self.inner.outcomes.read();
        let Some(o) = outcomes.get(&net) else {
            return Ok(Vec::new());
        };

        let mut records: Vec<OutcomeRecord> = o
            .unary
            .iter()
            .map(|(&(task, relation), &value)| OutcomeRecord {
                net,
                task_a: task,
                task_b: None,
                relation,
                value,
            })
            .chain(o.binary.iter().map(|(&(a, b, relation), &value)| OutcomeRecord {
                net,
                task_a: a,
                task_b: Some(b),
                relation,
                value,
            }))
            .collect();
        records.sort_by_key(|r| (r.relation, r.task_a, r.task_b));
        Ok(records)
    }

    fn outcome_count(&self, net: NetId) -> Result<usize> {
        Ok(self.inner.outcomes.read().get(&net).map_or(0, NetOutcomes::len))
    }
}

// ============================================================================
// Tests
// ============================================================================
