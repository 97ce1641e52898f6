//! # pql-index: Behavioral Relation Index for Process Models
//!
//! Indexes behavioral relations between the activities ("tasks") of a
//! Petri net so that later queries can answer, without replaying the
//! model, whether two activities can conflict, can co-occur, are totally
//! causal or totally concurrent, can occur, or always occur.
//!
//! Every answer is three-valued: exact decision procedures may be
//! infeasible, so UNKNOWN is a first-class outcome and is never persisted.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `NetRepository`, `LabelManager`, `BasicPredicates`
//!    and `IndexStore` are the contracts to the outside world
//! 2. **Cache by class, not identity**: tasks with equal label classes
//!    share one evaluator call per relation
//! 3. **The status record is the only shared state**: everything else a
//!    build touches is owned by that build
//!
//! ## Quick Start
//!
//! ```rust
//! use pql_index::{
//!     IndexStatus, IndexStore, MemoryIndexStore, MemoryLabelManager,
//!     MemoryNetRepository, NetSystem, NetId, RelationIndexBuilder,
//!     ScriptedPredicates, Relation, Tvl,
//! };
//!
//! # fn example() -> pql_index::Result<()> {
//! let nets = MemoryNetRepository::new();
//! let mut net = NetSystem::new(NetId(1), "order-to-cash");
//! net.add_transition(Some("Ship"));
//! nets.insert(net);
//!
//! let labels = MemoryLabelManager::new(vec![1.0])?;
//! let store = MemoryIndexStore::new();
//! store.register_net(NetId(1), Default::default())?;
//! assert!(store.claim(NetId(1))?);
//!
//! let mut evaluator = ScriptedPredicates::new()
//!     .with_unary(Relation::CanOccur, ["Ship"], Tvl::True);
//!
//! let mut builder = RelationIndexBuilder::new(&nets, &labels, &mut evaluator, &store);
//! assert!(builder.build(NetId(1)));
//! assert_eq!(store.get_status(NetId(1))?, IndexStatus::Indexed);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Collaborators
//!
//! | Contract | Reference implementation | Role |
//! |----------|--------------------------|------|
//! | `NetRepository` | `MemoryNetRepository` | Restores a net system |
//! | `LabelManager` | `MemoryLabelManager` | Label classes and task ids |
//! | `BasicPredicates` | `ScriptedPredicates`, `IndexedPredicates` | Decides primitive relations |
//! | `IndexStore` | `MemoryIndexStore` | Outcomes and status lifecycle |

// ============================================================================
// Modules
// ============================================================================

pub mod logic;
pub mod model;
pub mod label;
pub mod persist;
pub mod evaluator;
pub mod storage;
pub mod index;
pub mod config;
pub mod export;

// ============================================================================
// Re-exports: Logic and Model
// ============================================================================

pub use logic::{CompositeRelation, Relation, ThreeValuedLogicValue, Tvl};

pub use model::{
    Flow, IndexStatus, IndexType, LabelClass, NetId, NetSystem, PlaceId,
    Task, TaskId, Transition, TransitionId,
};

// ============================================================================
// Re-exports: Collaborators
// ============================================================================

pub use label::{LabelManager, MemoryLabelManager};
pub use persist::{MemoryNetRepository, NetRepository};
pub use evaluator::{BasicPredicates, CompositeRelations, IndexedPredicates, ScriptedPredicates};
pub use storage::{IndexStore, MemoryIndexStore, OutcomeRecord};

// ============================================================================
// Re-exports: Indexing
// ============================================================================

pub use index::{BuildReport, FailurePolicy, IndexScheduler, JobOutcome, RelationIndexBuilder};
pub use config::IndexConfig;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Net {0} not found")]
    NetNotFound(NetId),

    #[error("Net restore error: {0}")]
    NetRestore(String),

    #[error("Evaluator error: {0}")]
    Evaluator(String),

    #[error("Label manager error: {0}")]
    Label(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Net {net} is not claimed for indexing (status {status})")]
    NotClaimed { net: NetId, status: IndexStatus },

    #[error("Invalid status transition for net {net}: {from} -> {to}")]
    InvalidTransition { net: NetId, from: IndexStatus, to: IndexStatus },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
