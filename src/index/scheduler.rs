//! Job scheduler.
//!
//! Claims unindexed nets one at a time, runs a builder on each, and applies
//! the failure policy when a build fails. The claim is the store's atomic
//! UNINDEXED → INDEXING flip, so several schedulers (each with its own
//! evaluator) can share one store.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::builder::{BuildReport, RelationIndexBuilder};
use crate::Result;
use crate::config::IndexConfig;
use crate::evaluator::BasicPredicates;
use crate::label::LabelManager;
use crate::model::{IndexStatus, IndexType, NetId};
use crate::persist::NetRepository;
use crate::storage::IndexStore;

/// What to do with a net whose build failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Give up on the net: INDEXING → CANNOTINDEX.
    #[default]
    MarkCannotIndex,
    /// Hand the net back for a later retry: INDEXING → UNINDEXED.
    Release,
}

impl FailurePolicy {
    pub fn status_after_failure(self) -> IndexStatus {
        match self {
            FailurePolicy::MarkCannotIndex => IndexStatus::CannotIndex,
            FailurePolicy::Release => IndexStatus::Unindexed,
        }
    }
}

/// Result of one scheduled job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub net: NetId,
    /// Status the net was left in.
    pub status: IndexStatus,
    /// Present when the build succeeded.
    pub report: Option<BuildReport>,
    /// Present when the build failed.
    pub error: Option<String>,
}

impl JobOutcome {
    pub fn succeeded(&self) -> bool {
        self.report.is_some()
    }
}

pub struct IndexScheduler<'a, R: ?Sized, L: ?Sized, E: ?Sized, S: ?Sized> {
    nets: &'a R,
    labels: &'a L,
    evaluator: &'a mut E,
    store: &'a S,
    policy: FailurePolicy,
    index_type: IndexType,
}

impl<'a, R, L, E, S> IndexScheduler<'a, R, L, E, S>
where
    R: NetRepository + ?Sized,
    L: LabelManager + ?Sized,
    E: BasicPredicates + ?Sized,
    S: IndexStore + ?Sized,
{
    pub fn new(nets: &'a R, labels: &'a L, evaluator: &'a mut E, store: &'a S, config: &IndexConfig) -> Self {
        Self {
            nets,
            labels,
            evaluator,
            store,
            policy: config.failure_policy,
            index_type: config.index_type,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Register `net` for indexing with the configured index type.
    pub fn enqueue(&self, net: NetId) -> Result<()> {
        self.store.register_net(net, self.index_type)
    }

    /// Claim and index the next unindexed net. `None` when there is no work.
    pub fn run_next(&mut self) -> Result<Option<JobOutcome>> {
        let Some(net) = self.store.next_job()? else {
            return Ok(None);
        };
        let outcome = self.run_job(net);
        if !outcome.succeeded() {
            self.store.set_status(net, outcome.status)?;
        }
        Ok(Some(outcome))
    }

    /// Process jobs until none are left.
    ///
    /// Under `FailurePolicy::Release` a failed net keeps its claim until the
    /// queue is drained, so it is not picked again ahead of nets not yet
    /// tried. It is handed back as UNINDEXED before returning.
    pub fn run_until_idle(&mut self) -> Result<Vec<JobOutcome>> {
        let mut outcomes = Vec::new();
        let mut held = Vec::new();
        let drained = self.drain(&mut outcomes, &mut held);

        for net in held {
            self.store.set_status(net, IndexStatus::Unindexed)?;
        }
        drained?;

        info!(jobs = outcomes.len(), "Scheduler idle");
        Ok(outcomes)
    }

    fn drain(&mut self, outcomes: &mut Vec<JobOutcome>, held: &mut Vec<NetId>) -> Result<()> {
        while let Some(net) = self.store.next_job()? {
            let outcome = self.run_job(net);
            if !outcome.succeeded() {
                match self.policy {
                    FailurePolicy::Release => held.push(net),
                    FailurePolicy::MarkCannotIndex => self.store.set_status(net, outcome.status)?,
                }
            }
            outcomes.push(outcome);
        }
        Ok(())
    }

    /// Index a net this scheduler has already claimed. The status of a
    /// failed net is left to the caller.
    #[instrument(skip(self))]
    fn run_job(&mut self, net: NetId) -> JobOutcome {
        let result = RelationIndexBuilder::new(self.nets, self.labels, &mut *self.evaluator, self.store)
            .try_build(net);

        match result {
            Ok(report) => JobOutcome {
                net,
                status: IndexStatus::Indexed,
                report: Some(report),
                error: None,
            },
            Err(e) => {
                let status = self.policy.status_after_failure();
                warn!(%net, error = %e, next = %status, "Index build failed");
                JobOutcome { net, status, report: None, error: Some(e.to_string()) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_targets() {
        assert_eq!(FailurePolicy::MarkCannotIndex.status_after_failure(), IndexStatus::CannotIndex);
        assert_eq!(FailurePolicy::Release.status_after_failure(), IndexStatus::Unindexed);
        assert_eq!(FailurePolicy::default(), FailurePolicy::MarkCannotIndex);
    }
}
