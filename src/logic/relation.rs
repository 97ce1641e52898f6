//! Behavioral relation names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A primitive behavioral relation decided by the basic predicate evaluator
/// and persisted by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    CanOccur,
    AlwaysOccurs,
    CanConflict,
    CanCooccur,
    TotalCausal,
    TotalConcur,
}

impl Relation {
    pub const UNARY: [Relation; 2] = [Relation::CanOccur, Relation::AlwaysOccurs];
    pub const SYMMETRIC: [Relation; 2] = [Relation::CanCooccur, Relation::TotalConcur];
    pub const ASYMMETRIC: [Relation; 2] = [Relation::CanConflict, Relation::TotalCausal];

    /// Storage name of the relation.
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::CanOccur => "can_occur",
            Relation::AlwaysOccurs => "always_occurs",
            Relation::CanConflict => "can_conflict",
            Relation::CanCooccur => "can_cooccur",
            Relation::TotalCausal => "total_causal",
            Relation::TotalConcur => "total_concur",
        }
    }

    /// Relations the index evaluates once per unordered pair of classes.
    pub fn is_symmetric(self) -> bool {
        matches!(self, Relation::CanCooccur | Relation::TotalConcur)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relations derived from primitives at query time, never evaluated directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeRelation {
    Conflict,
    Cooccur,
}

impl CompositeRelation {
    pub fn as_str(self) -> &'static str {
        match self {
            CompositeRelation::Conflict => "conflict",
            CompositeRelation::Cooccur => "cooccur",
        }
    }
}

impl fmt::Display for CompositeRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
