//! # Basic Predicate Evaluation
//!
//! `BasicPredicates` is the decision procedure for the six primitive
//! behavioral relations on one net. How a relation is decided (reachability,
//! unfoldings, replay, a lookup table) is the implementor's business.
//!
//! An evaluator is bound to one net through `configure` and is used
//! exclusively by one build at a time, hence `&mut self` there.
//!
//! ## Implementations
//!
//! | Evaluator | Module | Description |
//! |-----------|--------|-------------|
//! | `ScriptedPredicates` | `scripted` | Table-driven, counts calls; for tests and embedding |
//! | `IndexedPredicates` | `indexed` | Answers from a finished index (query time) |

pub mod scripted;
pub mod indexed;

pub use indexed::IndexedPredicates;
pub use scripted::ScriptedPredicates;

use tracing::warn;

use crate::logic::{self, Relation, Tvl};
use crate::model::{NetSystem, Task};
use crate::{Error, Result};

/// Decision procedure for primitive relations on a configured net.
pub trait BasicPredicates {
    /// Bind the evaluator to a net. Must precede every predicate call.
    fn configure(&mut self, net: &NetSystem) -> Result<()>;

    fn can_occur(&self, task: &Task) -> Result<Tvl>;

    fn always_occurs(&self, task: &Task) -> Result<Tvl>;

    fn can_conflict(&self, a: &Task, b: &Task) -> Result<Tvl>;

    fn can_cooccur(&self, a: &Task, b: &Task) -> Result<Tvl>;

    fn total_causal(&self, a: &Task, b: &Task) -> Result<Tvl>;

    fn total_concur(&self, a: &Task, b: &Task) -> Result<Tvl>;

    /// Dispatch a unary relation by name.
    fn unary(&self, relation: Relation, task: &Task) -> Result<Tvl> {
        match relation {
            Relation::CanOccur => self.can_occur(task),
            Relation::AlwaysOccurs => self.always_occurs(task),
            other => Err(Error::Evaluator(format!("{other} is not a unary relation"))),
        }
    }

    /// Dispatch a binary relation by name.
    fn binary(&self, relation: Relation, a: &Task, b: &Task) -> Result<Tvl> {
        match relation {
            Relation::CanConflict => self.can_conflict(a, b),
            Relation::CanCooccur => self.can_cooccur(a, b),
            Relation::TotalCausal => self.total_causal(a, b),
            Relation::TotalConcur => self.total_concur(a, b),
            other => Err(Error::Evaluator(format!("{other} is not a binary relation"))),
        }
    }
}

/// A failed predicate call counts as an inconclusive one.
pub(crate) fn degrade(relation: Relation, result: Result<Tvl>) -> Tvl {
    result.unwrap_or_else(|e| {
        warn!(%relation, error = %e, "Predicate evaluation failed, treating as UNKNOWN");
        Tvl::Unknown
    })
}

/// Composite relations derived from the primitives.
///
/// Primitive failures degrade to UNKNOWN before composition, so these are
/// total functions.
pub trait CompositeRelations: BasicPredicates {
    fn conflict(&self, a: &Task, b: &Task) -> Tvl {
        logic::conflict(
            degrade(Relation::CanConflict, self.can_conflict(a, b)),
            degrade(Relation::CanConflict, self.can_conflict(b, a)),
            degrade(Relation::CanCooccur, self.can_cooccur(a, b)),
        )
    }

    fn cooccur(&self, a: &Task, b: &Task) -> Tvl {
        logic::cooccur(
            degrade(Relation::CanConflict, self.can_conflict(a, b)),
            degrade(Relation::CanConflict, self.can_conflict(b, a)),
            degrade(Relation::CanCooccur, self.can_cooccur(a, b)),
        )
    }
}

impl<T: BasicPredicates + ?Sized> CompositeRelations for T {}
