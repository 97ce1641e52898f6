//! Index lifecycle: status, type, and the legal status transitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-net index status. Exactly one holds per net at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexStatus {
    /// No build attempted, or the previous index was deleted.
    Unindexed,
    /// Claimed for a build, or left claimed by a failed one.
    Indexing,
    Indexed,
    /// The net could not be indexed.
    CannotIndex,
}

impl IndexStatus {
    /// Persisted status code.
    pub fn code(self) -> i8 {
        match self {
            IndexStatus::Unindexed => -1,
            IndexStatus::Indexing => 0,
            IndexStatus::Indexed => 1,
            IndexStatus::CannotIndex => 2,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(IndexStatus::Unindexed),
            0 => Some(IndexStatus::Indexing),
            1 => Some(IndexStatus::Indexed),
            2 => Some(IndexStatus::CannotIndex),
            _ => None,
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Deletion (any → UNINDEXED) is a separate operation and bypasses this table.
    pub fn can_transition_to(self, next: IndexStatus) -> bool {
        use IndexStatus::*;
        self == next
            || matches!(
                (self, next),
                (Unindexed, Indexing) | (Indexing, Indexed) | (Indexing, CannotIndex) | (Indexing, Unindexed)
            )
    }
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IndexStatus::Unindexed => "UNINDEXED",
            IndexStatus::Indexing => "INDEXING",
            IndexStatus::Indexed => "INDEXED",
            IndexStatus::CannotIndex => "CANNOTINDEX",
        };
        f.write_str(s)
    }
}

/// Kind of index maintained for a net.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexType {
    /// Behavioral-relation predicates.
    #[default]
    Predicates,
}

impl IndexType {
    pub fn code(self) -> i8 {
        match self {
            IndexType::Predicates => 0,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(IndexType::Predicates),
            _ => None,
        }
    }
}
