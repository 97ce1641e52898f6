//! # Three-Valued Logic
//!
//! Kleene logic over {TRUE, FALSE, UNKNOWN}. Decision procedures for
//! behavioral relations can be inconclusive, so every predicate answer in
//! this crate is a [`ThreeValuedLogicValue`] rather than a `bool`.
//!
//! This module is pure: no I/O and no state.

pub mod relation;

pub use relation::{CompositeRelation, Relation};

use std::fmt;

use serde::{Deserialize, Serialize};

/// A Kleene truth value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreeValuedLogicValue {
    True,
    False,
    Unknown,
}

/// Short alias used throughout the crate.
pub type Tvl = ThreeValuedLogicValue;

impl ThreeValuedLogicValue {
    /// Kleene negation. UNKNOWN stays UNKNOWN.
    pub fn not(self) -> Self {
        match self {
            Tvl::True => Tvl::False,
            Tvl::False => Tvl::True,
            Tvl::Unknown => Tvl::Unknown,
        }
    }

    /// Kleene conjunction. FALSE dominates, then UNKNOWN.
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Tvl::False, _) | (_, Tvl::False) => Tvl::False,
            (Tvl::Unknown, _) | (_, Tvl::Unknown) => Tvl::Unknown,
            (Tvl::True, Tvl::True) => Tvl::True,
        }
    }

    /// Kleene disjunction. TRUE dominates, then UNKNOWN.
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Tvl::True, _) | (_, Tvl::True) => Tvl::True,
            (Tvl::Unknown, _) | (_, Tvl::Unknown) => Tvl::Unknown,
            (Tvl::False, Tvl::False) => Tvl::False,
        }
    }

    pub fn is_unknown(self) -> bool {
        self == Tvl::Unknown
    }

    /// The definite value, or `None` for UNKNOWN.
    ///
    /// This is the persistence boundary: only `Some(_)` is ever written.
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Tvl::True => Some(true),
            Tvl::False => Some(false),
            Tvl::Unknown => None,
        }
    }
}

impl From<bool> for ThreeValuedLogicValue {
    fn from(b: bool) -> Self {
        if b { Tvl::True } else { Tvl::False }
    }
}

/// A stored row is definite; a missing row is UNKNOWN (open world).
impl From<Option<bool>> for ThreeValuedLogicValue {
    fn from(b: Option<bool>) -> Self {
        b.map_or(Tvl::Unknown, Tvl::from)
    }
}

impl std::ops::Not for ThreeValuedLogicValue {
    type Output = Self;

    fn not(self) -> Self {
        ThreeValuedLogicValue::not(self)
    }
}

impl std::ops::BitAnd for ThreeValuedLogicValue {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl std::ops::BitOr for ThreeValuedLogicValue {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl fmt::Display for ThreeValuedLogicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tvl::True => write!(f, "TRUE"),
            Tvl::False => write!(f, "FALSE"),
            Tvl::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ============================================================================
// Composite relations (4C spectrum, Def. 4.2)
// ============================================================================

/// `conflict(a,b) = (canConflict(a,b) ∧ canConflict(b,a)) ∧ ¬canCooccur(a,b)`
pub fn conflict(can_conflict_ab: Tvl, can_conflict_ba: Tvl, can_cooccur_ab: Tvl) -> Tvl {
    can_conflict_ab.and(can_conflict_ba).and(can_cooccur_ab.not())
}

/// `cooccur(a,b) = (¬canConflict(a,b) ∧ ¬canConflict(b,a)) ∧ canCooccur(a,b)`
pub fn cooccur(can_conflict_ab: Tvl, can_conflict_ba: Tvl, can_cooccur_ab: Tvl) -> Tvl {
    can_conflict_ab.not().and(can_conflict_ba.not()).and(can_cooccur_ab)
}
