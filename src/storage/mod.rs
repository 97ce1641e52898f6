//! # Index Store Trait
//!
//! The contract between the indexing engine and whatever durably records
//! relation outcomes and per-net index status.
//!
//! ## Semantics
//!
//! - Outcome writes are idempotent upserts. A build that fails halfway
//!   leaves its rows in place; a retry overwrites them (at-least-once).
//! - Only definite outcomes are stored. A missing row means UNKNOWN.
//! - Tasks with an id below 1 are never stored.
//! - The status record is the only state shared between concurrent builds;
//!   `claim` and `next_job` must be atomic conditional updates.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryIndexStore` | `memory` | In-memory for testing/embedding |

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::logic::Relation;
use crate::model::{IndexStatus, IndexType, NetId, TaskId};

pub use memory::MemoryIndexStore;

// ============================================================================
// Outcome record
// ============================================================================

/// One persisted relation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub net: NetId,
    pub task_a: TaskId,
    /// Present for binary relations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_b: Option<TaskId>,
    pub relation: Relation,
    pub value: bool,
}

// ============================================================================
// IndexStore Trait
// ============================================================================

/// Durable record of relation outcomes and index status per net.
///
/// Nets never registered read as UNINDEXED with no index type.
pub trait IndexStore: Send + Sync {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Make a net known to the store as UNINDEXED. No-op if already known.
    fn register_net(&self, net: NetId, index_type: IndexType) -> Result<()>;

    fn get_status(&self, net: NetId) -> Result<IndexStatus>;

    /// Index type recorded for the net, `None` if the net is unknown.
    fn get_index_type(&self, net: NetId) -> Result<Option<IndexType>>;

    /// Move the net to `status`. Fails with `Error::InvalidTransition` if
    /// the lifecycle does not allow it.
    fn set_status(&self, net: NetId, status: IndexStatus) -> Result<()>;

    /// Atomically flip UNINDEXED → INDEXING. Returns whether this caller
    /// now holds the claim.
    fn claim(&self, net: NetId) -> Result<bool>;

    /// Atomically claim the next UNINDEXED net, if any.
    fn next_job(&self) -> Result<Option<NetId>>;

    /// Remove every outcome of the net and reset it to UNINDEXED.
    /// Returns the number of outcome rows removed.
    fn delete_index(&self, net: NetId) -> Result<usize>;

    /// Release abandoned claims and drop rows of nets that are not indexed.
    /// Returns the number of nets released.
    fn cleanup(&self) -> Result<usize>;

    // ========================================================================
    // Outcomes
    // ========================================================================

    fn write_unary_outcome(&self, net: NetId, task: TaskId, relation: Relation, value: bool) -> Result<()>;

    fn write_binary_outcome(
        &self,
        net: NetId,
        task_a: TaskId,
        task_b: TaskId,
        relation: Relation,
        value: bool,
    ) -> Result<()>;

    fn read_unary_outcome(&self, net: NetId, task: TaskId, relation: Relation) -> Result<Option<bool>>;

    fn read_binary_outcome(
        &self,
        net: NetId,
        task_a: TaskId,
        task_b: TaskId,
        relation: Relation,
    ) -> Result<Option<bool>>;

    /// Every stored outcome of the net, in a stable order.
    fn outcomes(&self, net: NetId) -> Result<Vec<OutcomeRecord>>;

    /// Number of stored outcome rows for the net.
    ///
    /// Default: counts `outcomes()`.
    fn outcome_count(&self, net: NetId) -> Result<usize> {
        Ok(self.outcomes(net)?.len())
    }
}
